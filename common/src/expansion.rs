// Endpoint template expansion
// Turns the declarative endpoint list into a flat list of concrete endpoints

use crate::models::{Endpoint, EndpointTemplate};

/// Placeholder replaced by `Iteration::name` in the endpoint name
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Placeholder replaced by `Iteration::id` in the endpoint URL
pub const ID_PLACEHOLDER: &str = "{id}";

/// Expand endpoint templates into concrete endpoints
///
/// Each template with iterations yields one endpoint per iteration, in
/// iteration order; a template without iterations passes through unchanged,
/// placeholders included. Output order follows template order.
///
/// Only the first occurrence of each placeholder is substituted.
pub fn expand(templates: &[EndpointTemplate]) -> Vec<Endpoint> {
    let capacity = templates
        .iter()
        .map(|t| t.iterations.len().max(1))
        .sum();
    let mut endpoints = Vec::with_capacity(capacity);

    for template in templates {
        if template.iterations.is_empty() {
            endpoints.push(Endpoint::from(template.clone()));
            continue;
        }

        for iteration in &template.iterations {
            endpoints.push(Endpoint {
                name: template.name.replacen(NAME_PLACEHOLDER, &iteration.name, 1),
                url: template.url.replacen(ID_PLACEHOLDER, &iteration.id, 1),
                method: template.method.clone(),
            });
        }
    }

    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Iteration;

    fn template(name: &str, url: &str, iterations: &[(&str, &str)]) -> EndpointTemplate {
        EndpointTemplate {
            name: name.to_string(),
            url: url.to_string(),
            method: "GET".to_string(),
            iterations: iterations
                .iter()
                .map(|(name, id)| Iteration {
                    name: name.to_string(),
                    id: id.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_expand_with_iterations() {
        let templates = vec![template(
            "Test ({name})",
            "https://example.com/{id}",
            &[("Org1", "id1"), ("Org2", "id2")],
        )];

        let endpoints = expand(&templates);

        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("Test (Org1)", "https://example.com/id1", "GET"),
                Endpoint::new("Test (Org2)", "https://example.com/id2", "GET"),
            ]
        );
    }

    #[test]
    fn test_expand_without_iterations_passes_through() {
        let templates = vec![template("Static {name}", "https://example.com/{id}", &[])];

        let endpoints = expand(&templates);

        assert_eq!(
            endpoints,
            vec![Endpoint::new(
                "Static {name}",
                "https://example.com/{id}",
                "GET"
            )]
        );
    }

    #[test]
    fn test_expand_replaces_first_occurrence_only() {
        let templates = vec![template(
            "X {name} and {name}",
            "https://example.com/{id}/{id}",
            &[("A", "a1")],
        )];

        let endpoints = expand(&templates);

        assert_eq!(endpoints[0].name, "X A and {name}");
        assert_eq!(endpoints[0].url, "https://example.com/a1/{id}");
    }

    #[test]
    fn test_expand_mixed_templates_preserves_order() {
        let templates = vec![
            template("Static Endpoint", "https://example.com/health", &[]),
            template(
                "Dynamic {name}",
                "https://example.com/{id}/status",
                &[("Instance1", "inst1"), ("Instance2", "inst2")],
            ),
        ];

        let names: Vec<String> = expand(&templates).into_iter().map(|e| e.name).collect();

        assert_eq!(
            names,
            vec!["Static Endpoint", "Dynamic Instance1", "Dynamic Instance2"]
        );
    }

    #[test]
    fn test_expand_copies_method_verbatim() {
        let mut t = template("Svc {name}", "https://example.com/{id}", &[("A", "1")]);
        t.method = "p{name}st".to_string();

        let endpoints = expand(&[t]);

        assert_eq!(endpoints[0].method, "p{name}st");
    }

    #[test]
    fn test_expand_empty_list() {
        assert!(expand(&[]).is_empty());
    }
}
