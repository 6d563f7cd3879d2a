use serde::{ Deserialize, Serialize };

/// A bookmark as returned by the remote API.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BookmarkRecord {
    #[serde(default)]
    pub query_id: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub is_bookmark: Option<bool>,
}

/// Why a fetch did not produce bookmarks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchFailure {
    Transport {
        message: String,
    },
    Api {
        status: u16,
    },
    /// A successful response whose body reported `success: false`.
    Rejected {
        errors: Vec<String>,
    },
}

impl FetchFailure {
    /// Classifies a body that reported `success: false` on its own.
    pub fn reported(payload: &BookmarkPayload) -> Self {
        match payload.status_code {
            Some(status) if !(200..300).contains(&status) => FetchFailure::Api { status },
            _ => FetchFailure::Rejected { errors: payload.errors().to_vec() },
        }
    }
}

/// Body of `GET /bookmark`, or the normalised failure record built when
/// the request could not be completed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BookmarkPayload {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Vec<BookmarkRecord>>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(skip)]
    pub failure: Option<FetchFailure>,
}

impl BookmarkPayload {
    pub fn failed(failure: FetchFailure) -> Self {
        let (errors, status_code) = match &failure {
            FetchFailure::Transport { message } =>
                (vec![format!("Network error: {}", message)], Some(500)),
            FetchFailure::Api { status } =>
                (vec![format!("API request failed with status {}", status)], Some(*status)),
            FetchFailure::Rejected { errors } => (errors.clone(), None),
        };
        Self {
            success: Some(false),
            data: Some(Vec::new()),
            errors: Some(errors),
            status_code,
            failure: Some(failure),
        }
    }

    /// An absent `success` flag counts as success.
    pub fn is_success(&self) -> bool {
        self.success != Some(false)
    }

    pub fn records(&self) -> &[BookmarkRecord] {
        self.data.as_deref().unwrap_or(&[])
    }

    pub fn errors(&self) -> &[String] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

/// Display form of a bookmark. Always rebuilt from a `BookmarkRecord`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedBookmark {
    pub id: String,
    pub query_id: String,
    pub query: String,
    pub response_html: String,
    pub reference_link: Option<String>,
    pub is_bookmark: bool,
}
