//! Validation of the login, password recovery and admin creation forms.

use crate::api::{CreateAdminRequest, VerifyOtpRequest};
use crate::validation::{
    exact_chars, min_chars, require_email, require_text, Reason, ValidationError, ValidationErrors,
};

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const OTP_CHARS: usize = 4;

/// Required first, then the email shape, so each field reports one error.
fn check_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    match require_text(field, value) {
        Err(e) => errors.push(e),
        Ok(()) => errors.check(require_email(field, value)),
    }
}

fn check_password(errors: &mut ValidationErrors, field: &str, value: &str) {
    match require_text(field, value) {
        Err(e) => errors.push(e),
        Ok(()) => errors.check(min_chars(field, value, MIN_PASSWORD_CHARS)),
    }
}

fn check_confirmation(errors: &mut ValidationErrors, password: &str, confirm: &str) {
    if errors.for_field("confirmPassword").is_empty() && password != confirm {
        errors.push(ValidationError::new(
            "confirmPassword",
            Reason::Mismatch {
                other: "password".to_string(),
            },
        ));
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, "email", &self.email);
        check_password(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OtpForm {
    pub otp: String,
}

impl OtpForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(exact_chars("otp", &self.otp, OTP_CHARS));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, "email", &self.email);
        let otp = OtpForm {
            otp: self.otp.clone(),
        };
        if let Err(otp_errors) = otp.validate() {
            errors.extend(otp_errors);
        }
        check_password(&mut errors, "newPassword", &self.new_password);
        check_password(&mut errors, "confirmPassword", &self.confirm_password);
        check_confirmation(&mut errors, &self.new_password, &self.confirm_password);
        errors.into_result()
    }

    pub fn into_request(self) -> Result<VerifyOtpRequest, ValidationErrors> {
        self.validate()?;
        Ok(VerifyOtpRequest {
            email: self.email,
            otp: self.otp,
            new_password: self.new_password,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateAdminForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl CreateAdminForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(require_text("firstName", &self.first_name));
        errors.check(require_text("lastName", &self.last_name));
        check_email(&mut errors, "email", &self.email);
        check_password(&mut errors, "password", &self.password);
        errors.check(require_text("confirmPassword", &self.confirm_password));
        check_confirmation(&mut errors, &self.password, &self.confirm_password);
        errors.into_result()
    }

    pub fn into_request(self) -> Result<CreateAdminRequest, ValidationErrors> {
        self.validate()?;
        Ok(CreateAdminRequest {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Login Tests ====================

    #[test]
    fn test_login_valid() {
        let form = LoginForm {
            email: "admin@gmail.com".to_string(),
            password: "admin123".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_login_one_error_per_field() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("email")[0].reason, Reason::Required);
        assert_eq!(errors.for_field("password")[0].reason, Reason::Required);
    }

    #[test]
    fn test_login_short_password() {
        let form = LoginForm {
            email: "admin@gmail.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.for_field("password")[0].reason,
            Reason::TooShort { min: 6 }
        );
    }

    // ==================== Recovery Tests ====================

    #[test]
    fn test_forgot_password_email_format() {
        let form = ForgotPasswordForm {
            email: "admin".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.for_field("email")[0].reason, Reason::InvalidEmail);
    }

    #[test]
    fn test_otp_exactly_four() {
        assert!(OtpForm { otp: "1234".to_string() }.validate().is_ok());
        assert!(OtpForm { otp: "123".to_string() }.validate().is_err());
        assert!(OtpForm { otp: "12345".to_string() }.validate().is_err());
    }

    #[test]
    fn test_reset_applies_otp_rule() {
        let form = ResetPasswordForm {
            email: "admin@gmail.com".to_string(),
            otp: "12".to_string(),
            new_password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.for_field("otp")[0].reason,
            Reason::WrongLength { expected: 4 }
        );
    }

    #[test]
    fn test_reset_mismatch_on_confirm_field() {
        let form = ResetPasswordForm {
            email: "admin@gmail.com".to_string(),
            otp: "1234".to_string(),
            new_password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.for_field("confirmPassword")[0].reason,
            Reason::Mismatch {
                other: "password".to_string()
            }
        );
    }

    #[test]
    fn test_reset_into_request() {
        let form = ResetPasswordForm {
            email: "admin@gmail.com".to_string(),
            otp: "1234".to_string(),
            new_password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        let request = form.into_request().expect("valid");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "admin@gmail.com", "otp": "1234", "newPassword": "secret1"})
        );
    }

    // ==================== Create Admin Tests ====================

    #[test]
    fn test_create_admin_requires_names() {
        let form = CreateAdminForm {
            email: "new@example.uz".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("firstName").len(), 1);
        assert_eq!(errors.for_field("lastName").len(), 1);
    }

    #[test]
    fn test_create_admin_into_request() {
        let form = CreateAdminForm {
            first_name: "Aziz".to_string(),
            last_name: "Karimov".to_string(),
            email: "aziz@example.uz".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        let json = serde_json::to_value(form.into_request().expect("valid")).unwrap();
        assert_eq!(json["firstName"], "Aziz");
        assert_eq!(json["lastName"], "Karimov");
        assert!(json.get("confirmPassword").is_none());
    }

    #[test]
    fn test_create_admin_mismatch() {
        let form = CreateAdminForm {
            first_name: "Aziz".to_string(),
            last_name: "Karimov".to_string(),
            email: "aziz@example.uz".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret9".to_string(),
        };
        assert_eq!(form.validate().unwrap_err().for_field("confirmPassword").len(), 1);
    }
}
