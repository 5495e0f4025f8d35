use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "user_id": 4,
    "full_name": "Amina Haddad",
    "employee_number": "E-1042",
    "grade": "B2",
    "job_function": "Accountant",
    "hire_date": "2019-09-01"
}))]
pub struct Profile {
    pub user_id: u64,
    pub full_name: String,
    pub employee_number: Option<String>,
    pub grade: Option<String>,
    pub job_function: Option<String>,
    #[schema(format = "date", value_type = Option<String>)]
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    pub employee_number: Option<String>,
    pub grade: Option<String>,
    pub job_function: Option<String>,
    #[schema(format = "date", value_type = Option<String>)]
    pub hire_date: Option<NaiveDate>,
}

impl UpdateProfile {
    pub fn into_profile(self, user_id: u64) -> Profile {
        Profile {
            user_id,
            full_name: self.full_name.trim().to_string(),
            employee_number: self.employee_number,
            grade: self.grade,
            job_function: self.job_function,
            hire_date: self.hire_date,
        }
    }
}
