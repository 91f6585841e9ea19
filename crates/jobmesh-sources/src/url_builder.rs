//! Search URL construction from definitions and location hints.

use crate::definition::SearchMethod;
use crate::error::{Result, SourceError};
use crate::locale::LocaleSignal;
use jobmesh_core::SourceId;

/// Build the request URL for one source.
///
/// Browser templates get `{query}` and `{location}` substituted
/// (percent-encoded), with a regional template preferred when one matches the
/// locale. REST endpoints get the configured query-string parameters.
pub fn build_search_url(
    source_id: &SourceId,
    method: &SearchMethod,
    query: &str,
    location: &str,
    locale: &LocaleSignal,
) -> Result<String> {
    match method {
        SearchMethod::Browser {
            template,
            default_location,
            regional,
            ..
        } => {
            let template = locale
                .region_code()
                .and_then(|code| {
                    regional
                        .iter()
                        .find(|route| route.region.eq_ignore_ascii_case(code))
                })
                .map_or(template.as_str(), |route| route.template.as_str());

            let location = if location.trim().is_empty() {
                default_location.as_deref().unwrap_or_default()
            } else {
                location
            };

            Ok(fill_template(template, query, location))
        }
        SearchMethod::RestApi {
            endpoint,
            query_param,
            location_param,
            params,
            ..
        } => {
            let mut url = url::Url::parse(endpoint).map_err(|e| SourceError::InvalidUrl {
                source_id: source_id.to_string(),
                reason: e.to_string(),
            })?;
            {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in params {
                    pairs.append_pair(key, value);
                }
                if let Some(param) = query_param {
                    pairs.append_pair(param, query.trim());
                }
                if let Some(param) = location_param {
                    if !location.trim().is_empty() {
                        pairs.append_pair(param, location.trim());
                    }
                }
            }
            Ok(url.into())
        }
    }
}

/// Substitute `{query}` and `{location}` with percent-encoded values.
#[must_use]
pub fn fill_template(template: &str, query: &str, location: &str) -> String {
    template
        .replace("{query}", &urlencoding::encode(query.trim()))
        .replace("{location}", &urlencoding::encode(location.trim()))
}
