use serde::Deserialize;
use utoipa::IntoParams;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_search_query;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
/// Query string of the album search proxy.
pub struct SearchQuery {
    /// Free-text search terms.
    #[serde(default)]
    pub q: String,
}

impl Validate for SearchQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_search_query(&self.q) {
            errors.add("q", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
