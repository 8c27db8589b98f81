use crate::config::RouteConfig;

/// Upstream selected for a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub service: String,
    pub upstream: String,
}

impl Route {
    /// Full upstream URL for `path_and_query`, which the upstream sees unchanged.
    pub fn target_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.upstream.trim_end_matches('/'), path_and_query)
    }
}

/// Path-prefix routing table. Prefixes only match on segment boundaries and
/// the longest matching prefix wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: impl IntoIterator<Item = RouteConfig>) -> Self {
        Self {
            routes: routes
                .into_iter()
                .map(|r| Route {
                    prefix: r.prefix.trim_end_matches('/').to_string(),
                    service: r.service,
                    upstream: r.upstream,
                })
                .collect(),
        }
    }

    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .filter(|r| segment_prefix(&r.prefix, path))
            .max_by_key(|r| r.prefix.len())
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn segment_prefix(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(prefix: &str, service: &str, upstream: &str) -> RouteConfig {
        RouteConfig {
            prefix: prefix.to_string(),
            service: service.to_string(),
            upstream: upstream.to_string(),
        }
    }

    fn table() -> RouteTable {
        RouteTable::new([
            route("/api/sales", "sale-service", "http://sales:8084"),
            route("/api/sales/reports", "report-service", "http://reports:9000/"),
            route("/api/products", "product-service", "http://products:8082"),
        ])
    }

    #[test]
    fn longest_prefix_wins() {
        let table = table();
        assert_eq!(
            table.resolve("/api/sales/client/3").map(|r| r.service.as_str()),
            Some("sale-service")
        );
        assert_eq!(
            table.resolve("/api/sales/reports/daily").map(|r| r.service.as_str()),
            Some("report-service")
        );
    }

    #[test]
    fn prefixes_match_whole_segments() {
        let table = table();
        assert!(table.resolve("/api/products").is_some());
        assert!(table.resolve("/api/productsx").is_none());
        assert!(table.resolve("/api/clients/1").is_none());
    }

    #[test]
    fn target_url_keeps_path_and_query() {
        let table = table();
        let reports = table.resolve("/api/sales/reports").unwrap();
        assert_eq!(
            reports.target_url("/api/sales/reports?page=1"),
            "http://reports:9000/api/sales/reports?page=1"
        );
    }
}
