use super::prelude::*;
use crate::routes::build_url;

#[derive(Default)]
pub struct RouteQueries;

#[Object]
impl RouteQueries {
    /// Build the URL of a named route
    async fn url(&self, route_id: String, params: Option<Vec<ParamInput>>) -> Result<String> {
        let params = params.unwrap_or_default();
        let pairs: Vec<(&str, &str)> = params
            .iter()
            .map(|p| (p.key.as_str(), p.value.as_str()))
            .collect();

        Ok(build_url(&route_id, &pairs)?)
    }
}
