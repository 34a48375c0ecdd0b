use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// 부분 업데이트 요청. None인 필드는 변경하지 않습니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}
