#![deny(missing_docs)]

//! # Route Assembly
//!
//! Joins the route table against the metadata store and builds the
//! Swagger document.
//!
//! Assembly is fail-soft: a route that cannot be documented is skipped with a
//! warning and never aborts the document.

use crate::config::SpecConfig;
use crate::metadata::{HandlerId, MetadataStore, ParamLocation, ParameterSpec, ResponseSpec, RouteMetadata};
use crate::oas::document::{Operation, SpecDocument};
use crate::path_template::PathTemplate;
use crate::registry::RouteTable;
use crate::schema_generator::DefinitionSpec;
use http::Method;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info, warn};

/// Builds the document for every exported handler reachable through `routes`.
pub fn assemble(routes: &dyn RouteTable, store: &MetadataStore, config: &SpecConfig) -> SpecDocument {
    let mut document = SpecDocument::new(config);
    let mut referenced = BTreeSet::new();

    for route in routes.registered_routes() {
        let template = match PathTemplate::parse(&route.path) {
            Ok(template) => template,
            Err(err) => {
                warn!(path = %route.path, handler = %route.handler, %err, "Skipping route with an invalid path template");
                continue;
            }
        };
        let metadata = store.lookup(&route.handler);
        if !metadata.exported {
            debug!(path = %route.path, handler = %route.handler, "Handler is not exported");
            continue;
        }

        if let Some(name) = shadowed_variable(&metadata, &template) {
            warn!(path = %route.path, handler = %route.handler, parameter = name, "Skipping route whose path variable is redeclared in another location");
            continue;
        }

        let path = template.documented_path();
        let mut seen = BTreeSet::new();
        for method in &route.methods {
            if *method == Method::HEAD || *method == Method::OPTIONS {
                continue;
            }
            let verb = method.as_str().to_ascii_lowercase();
            if !seen.insert(verb.clone()) {
                continue;
            }
            if document.operation(&path, &verb).is_some() {
                warn!(path = %path, method = %verb, handler = %route.handler, "Duplicate route, keeping the first registration");
                continue;
            }

            let operation = build_operation(&route.handler, &metadata, &template, &verb);
            let missing = operation_references(&operation).find(|name| store.definition(name).is_none());
            if let Some(name) = missing {
                warn!(path = %path, method = %verb, definition = name, "Skipping route referencing an unknown definition");
                continue;
            }

            referenced.extend(operation_references(&operation).map(str::to_string));
            document
                .paths
                .entry(path.clone())
                .or_default()
                .insert(verb, operation);
        }
    }

    document.definitions = reachable_definitions(referenced, store);
    info!(
        paths = document.paths.len(),
        operations = document.operation_count(),
        definitions = document.definitions.len(),
        "Assembled specification"
    );
    document
}

/// The responses used when a handler declares none.
pub fn default_responses(verb: &str) -> BTreeMap<String, ResponseSpec> {
    let (status, description) = match verb {
        "post" => ("201", "success"),
        "put" | "patch" | "delete" => ("204", "success"),
        _ => ("200", "api result"),
    };
    BTreeMap::from([(status.to_string(), ResponseSpec::new(status, description))])
}

/// A template variable that a wrapper declared in a location other than `path`.
pub fn shadowed_variable<'t>(metadata: &RouteMetadata, template: &'t PathTemplate) -> Option<&'t str> {
    template
        .variables()
        .map(|(name, _)| name)
        .find(|name| {
            metadata
                .parameter(name)
                .is_some_and(|p| p.location != ParamLocation::Path)
        })
}

fn operation_references(operation: &Operation) -> impl Iterator<Item = &str> {
    operation
        .parameters
        .iter()
        .flat_map(ParameterSpec::references)
        .chain(operation.responses.values().flat_map(ResponseSpec::references))
}

fn build_operation(handler: &HandlerId, metadata: &RouteMetadata, template: &PathTemplate, verb: &str) -> Operation {
    let mut parameters: Vec<ParameterSpec> = template
        .variables()
        .filter(|(name, _)| {
            metadata
                .parameter(name)
                .map_or(true, |p| p.location != ParamLocation::Path)
        })
        .map(|(name, type_)| ParameterSpec {
            name: name.to_string(),
            location: ParamLocation::Path,
            type_: Some(type_),
            items: None,
            schema: None,
            required: true,
            description: name.to_string(),
            default: None,
            allowed: None,
        })
        .collect();
    parameters.extend(metadata.parameters.iter().cloned());

    let responses = if metadata.responses.is_empty() {
        default_responses(verb)
    } else {
        metadata.responses.clone()
    };

    let tags = if metadata.tags.is_empty() {
        vec![handler.default_tag().to_string()]
    } else {
        metadata.tags.iter().cloned().collect()
    };

    Operation {
        summary: metadata.summary.clone().unwrap_or_default(),
        description: metadata.description.clone().unwrap_or_default(),
        tags,
        parameters,
        responses,
        security: Vec::new(),
    }
}

fn reachable_definitions(
    roots: BTreeSet<String>,
    store: &MetadataStore,
) -> BTreeMap<String, DefinitionSpec> {
    let mut out = BTreeMap::new();
    let mut queue: VecDeque<String> = roots.into_iter().collect();
    while let Some(name) = queue.pop_front() {
        if out.contains_key(&name) {
            continue;
        }
        let Some(definition) = store.definition(&name) else {
            warn!(definition = %name, "Nested definition missing from the store");
            continue;
        };
        queue.extend(definition.references().into_iter().map(str::to_string));
        out.insert(name, definition.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs;
    use crate::fields::{FieldSpec, SchemaDecl};
    use crate::registry::Router;
    use crate::schema_generator::{introspect, PropertySchema};
    use crate::type_mapping::{FieldTypeRegistry, TypeDescriptor};
    use pretty_assertions::assert_eq;

    crate::field_schema! {
        struct AddressSchema {
            FieldSpec::string("street"),
        }
    }

    crate::field_schema! {
        struct PersonSchema {
            FieldSpec::string("name"),
            FieldSpec::nested::<AddressSchema>("address"),
        }
    }

    fn exported(store: &mut MetadataStore, id: &HandlerId) {
        store
            .contribute(id, RouteMetadata::documented(&docs::parse("summary\n---")))
            .unwrap();
    }

    fn with_response(store: &mut MetadataStore, id: &HandlerId) {
        let result = introspect(&SchemaDecl::of::<PersonSchema>(), &id.namespace(), &FieldTypeRegistry::new()).unwrap();
        let mut meta = RouteMetadata::default();
        meta.responses.insert(
            "200".into(),
            ResponseSpec {
                status: "200".into(),
                description: "api result".into(),
                schema: Some(PropertySchema::reference(&result.root)),
            },
        );
        store.define(result.definitions).unwrap();
        store.contribute(id, meta).unwrap();
    }

    #[test]
    fn test_default_responses_per_verb() {
        assert!(default_responses("post").contains_key("201"));
        assert_eq!(default_responses("delete")["204"].description, "success");
        assert_eq!(default_responses("get")["200"].description, "api result");
    }

    #[test]
    fn test_path_parameters_and_defaults() {
        let id = HandlerId::new("app::users", "get_user");
        let mut store = MetadataStore::new();
        exported(&mut store, &id);
        let routes = Router::new().route("/users/<int:user_id>", [Method::GET, Method::HEAD], id.clone());

        let document = assemble(&routes, &store, &SpecConfig::default());
        let operation = document.operation("/users/{user_id}", "get").unwrap();
        assert_eq!(operation.tags, vec!["users"]);
        assert!(operation.security.is_empty());
        assert_eq!(operation.parameters.len(), 1);
        assert_eq!(operation.parameters[0].type_, Some(TypeDescriptor::new("integer")));
        assert_eq!(operation.parameters[0].description, "user_id");
        assert!(operation.parameters[0].required);
        assert!(operation.responses.contains_key("200"));
        assert!(document.operation("/users/{user_id}", "head").is_none());
    }

    #[test]
    fn test_unexported_handlers_are_omitted() {
        let id = HandlerId::new("app::users", "helper");
        let mut store = MetadataStore::new();
        store
            .contribute(&id, RouteMetadata::documented(&docs::parse("helper only")))
            .unwrap();
        let routes = Router::new().route("/helper", [Method::GET], id);
        let document = assemble(&routes, &store, &SpecConfig::default());
        assert!(document.paths.is_empty());
    }

    #[test]
    fn test_nested_definitions_are_reachable() {
        let id = HandlerId::new("app::people", "show");
        let mut store = MetadataStore::new();
        exported(&mut store, &id);
        with_response(&mut store, &id);
        let routes = Router::new().route("/people", [Method::GET], id);
        let document = assemble(&routes, &store, &SpecConfig::default());
        let names: Vec<&String> = document.definitions.keys().collect();
        assert_eq!(
            names,
            vec!["app::people::show:AddressSchema", "app::people::show:PersonSchema"]
        );
    }

    #[test]
    fn test_unused_definitions_are_not_emitted() {
        let shown = HandlerId::new("app::people", "show");
        let hidden = HandlerId::new("app::people", "hidden");
        let mut store = MetadataStore::new();
        exported(&mut store, &shown);
        with_response(&mut store, &hidden);
        let routes = Router::new()
            .route("/people", [Method::GET], shown)
            .route("/hidden", [Method::GET], hidden);
        let document = assemble(&routes, &store, &SpecConfig::default());
        assert!(document.definitions.is_empty());
        assert_eq!(document.operation_count(), 1);
    }

    #[test]
    fn test_fail_soft_skips() {
        let id = HandlerId::new("app::files", "read");
        let other = HandlerId::new("app::files", "other");
        let mut store = MetadataStore::new();
        exported(&mut store, &id);
        exported(&mut store, &other);

        let mut dangling = RouteMetadata::default();
        dangling.responses.insert(
            "200".into(),
            ResponseSpec {
                status: "200".into(),
                description: "x".into(),
                schema: Some(PropertySchema::reference("nowhere:Missing")),
            },
        );
        let broken = HandlerId::new("app::files", "broken");
        exported(&mut store, &broken);
        store.contribute(&broken, dangling).unwrap();

        let routes = Router::new()
            .route("/files/<hex:id>", [Method::GET], id.clone())
            .route("/files", [Method::GET], id)
            .route("/files", [Method::GET], other)
            .route("/broken", [Method::GET], broken);
        let document = assemble(&routes, &store, &SpecConfig::default());

        let paths: Vec<&String> = document.paths.keys().collect();
        assert_eq!(paths, vec!["/files"]);
        assert_eq!(document.operation_count(), 1);
    }

    fn declared(store: &mut MetadataStore, id: &HandlerId, name: &str, location: ParamLocation) {
        let param = ParameterSpec::from_field(&FieldSpec::integer(name), location, &FieldTypeRegistry::new()).unwrap();
        store
            .contribute(id, RouteMetadata { parameters: vec![param], ..RouteMetadata::default() })
            .unwrap();
    }

    #[test]
    fn test_only_declared_path_parameter_replaces_variable() {
        let typed = HandlerId::new("app::items", "typed");
        let shadowed = HandlerId::new("app::items", "shadowed");
        let mut store = MetadataStore::new();
        exported(&mut store, &typed);
        exported(&mut store, &shadowed);
        declared(&mut store, &typed, "id", ParamLocation::Path);
        declared(&mut store, &shadowed, "id", ParamLocation::Query);

        let routes = Router::new()
            .route("/items/<int:id>", [Method::GET], typed)
            .route("/other/<int:id>", [Method::GET], shadowed);
        let document = assemble(&routes, &store, &SpecConfig::default());

        let operation = document.operation("/items/{id}", "get").unwrap();
        assert_eq!(operation.parameters.len(), 1);
        assert_eq!(operation.parameters[0].location, ParamLocation::Path);
        assert!(document.operation("/other/{id}", "get").is_none());
    }

    #[test]
    fn test_body_schema_definitions_are_reachable() {
        let id = HandlerId::new("app::people", "create");
        let mut store = MetadataStore::new();
        exported(&mut store, &id);
        let result = introspect(&SchemaDecl::of::<PersonSchema>(), &id.namespace(), &FieldTypeRegistry::new()).unwrap();
        let body = ParameterSpec::body(PropertySchema::reference(&result.root), true);
        store.define(result.definitions).unwrap();
        store
            .contribute(&id, RouteMetadata { parameters: vec![body], ..RouteMetadata::default() })
            .unwrap();

        let routes = Router::new().route("/people", [Method::POST], id);
        let document = assemble(&routes, &store, &SpecConfig::default());
        assert_eq!(document.definitions.len(), 2);
        assert!(document.operation("/people", "post").unwrap().responses.contains_key("201"));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let id = HandlerId::new("app::people", "show");
        let mut store = MetadataStore::new();
        exported(&mut store, &id);
        with_response(&mut store, &id);
        let routes = Router::new().route("/people", [Method::GET, Method::POST], id);
        let first = assemble(&routes, &store, &SpecConfig::default());
        let second = assemble(&routes, &store, &SpecConfig::default());
        assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    }
}
