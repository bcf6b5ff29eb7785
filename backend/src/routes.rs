//! Named storefront/admin routes and URL building

use crate::error::{CatalogError, Result};

/// A named route with `:param` placeholders in its path
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub id: &'static str,
    pub path: &'static str,
}

pub const ROUTES: &[Route] = &[
    Route {
        id: "categoryView",
        path: "/category/:url_key",
    },
    Route {
        id: "categoryEdit",
        path: "/admin/category/edit/:id",
    },
    Route {
        id: "productView",
        path: "/product/:url_key",
    },
    Route {
        id: "productEdit",
        path: "/admin/product/edit/:id",
    },
    Route {
        id: "imageUpload",
        path: "/admin/images/upload/:0",
    },
];

/// Look up a route by id
pub fn find_route(route_id: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.id == route_id)
}

/// Build a URL for a named route, substituting every `:param` segment.
///
/// Parameters that the route does not declare are ignored.
pub fn build_url(route_id: &str, params: &[(&str, &str)]) -> Result<String> {
    let route = find_route(route_id).ok_or_else(|| CatalogError::UnknownRoute(route_id.to_string()))?;

    let segments = route
        .path
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| CatalogError::MissingRouteParam {
                    route: route.id.to_string(),
                    param: name.to_string(),
                }),
            None => Ok(segment),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(segments.join("/"))
}
