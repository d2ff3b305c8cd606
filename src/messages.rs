//! Localized user-facing messages
//!
//! One string per [`ErrorKind`], plus the short hint attached to validation
//! failures. Raw transport errors never reach the user; controllers look the
//! message up here instead.

use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Vietnamese
    #[default]
    Vi,
    /// English
    En,
}

/// Message catalog for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    /// Catalog for `locale`
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// The catalog's locale
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Message shown for an error kind
    pub fn error(&self, kind: ErrorKind) -> &'static str {
        match self.locale {
            Locale::Vi => match kind {
                ErrorKind::Network => "Không có kết nối mạng",
                ErrorKind::Server => "Lỗi server. Vui lòng thử lại sau",
                ErrorKind::Unauthorized => "Phiên đăng nhập hết hạn",
                ErrorKind::Forbidden => "Bạn không có quyền truy cập",
                ErrorKind::NotFound => "Không tìm thấy dữ liệu",
                ErrorKind::Validation => "Vui lòng kiểm tra lại thông tin",
                ErrorKind::Unknown => "Có lỗi xảy ra. Vui lòng thử lại",
            },
            Locale::En => match kind {
                ErrorKind::Network => "No network connection",
                ErrorKind::Server => "Server error. Please try again later",
                ErrorKind::Unauthorized => "Your session has expired",
                ErrorKind::Forbidden => "You do not have access",
                ErrorKind::NotFound => "Nothing was found",
                ErrorKind::Validation => "Please check the information and try again",
                ErrorKind::Unknown => "Something went wrong. Please try again",
            },
        }
    }

    /// Short "try again" hint
    pub fn retry_hint(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Thử lại",
            Locale::En => "Try again",
        }
    }
}

/// User-visible description of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error classification
    pub kind: ErrorKind,
    /// Localized message for `kind`
    pub message: String,
}

impl ErrorInfo {
    /// Describe `error` using `messages`; the error's own text is dropped
    pub fn from_error(error: &Error, messages: &Messages) -> Self {
        let kind = error.kind();
        Self {
            kind,
            message: messages.error(kind).to_string(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
