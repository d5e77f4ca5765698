//! GraphQL transport.
//!
//! The access guard runs before execution: the root fields the request
//! selects are resolved from the query document, looked up in the
//! capability table, and the token (when required) is verified once.
//! Verified claims are attached to the request data for resolvers.

mod auth_resolver;
mod user_resolver;

use std::collections::HashSet;
use std::sync::Arc;

use async_graphql::{
    http::GraphiQLSource,
    parser::{
        parse_query,
        types::{DocumentOperations, ExecutableDocument, Selection, SelectionSet},
    },
    EmptySubscription, ErrorExtensions, MergedObject, Pos, Request, Response, Schema,
};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    response::{Html, IntoResponse},
    Json,
};

pub use auth_resolver::AuthMutation;
pub use user_resolver::{UserMutation, UserQuery};

use crate::api::AppState;
use crate::services::{AuthService, UserService};

#[derive(MergedObject, Default)]
#[graphql(name = "Mutation")]
pub struct MutationRoot(AuthMutation, UserMutation);

pub type AppSchema = Schema<UserQuery, MutationRoot, EmptySubscription>;

/// Build the executable schema with its service dependencies.
pub fn build_schema(auth: Arc<dyn AuthService>, users: Arc<dyn UserService>) -> AppSchema {
    Schema::build(UserQuery, MutationRoot::default(), EmptySubscription)
        .data(auth)
        .data(users)
        .finish()
}

/// `POST /graphql`
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<Request>,
) -> Json<Response> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    // Unparsable documents select nothing; the executor reports the
    // syntax error itself.
    let fields = parse_query(&request.query)
        .map(|doc| root_fields(&doc, request.operation_name.as_deref()))
        .unwrap_or_default();

    match state
        .guard
        .authorize_fields(fields.iter().map(String::as_str), authorization)
    {
        Ok(Some(claims)) => Json(state.schema.execute(request.data(claims)).await),
        Ok(None) => Json(state.schema.execute(request).await),
        Err(err) => {
            tracing::debug!("GraphQL request rejected by guard: {}", err);
            Json(Response::from_errors(vec![
                err.extend().into_server_error(Pos::default())
            ]))
        }
    }
}

/// `GET /graphql`
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Root field names selected by the operation that will run. With
/// several operations and no name, all of them are considered.
pub fn root_fields(doc: &ExecutableDocument, operation_name: Option<&str>) -> Vec<String> {
    let selections: Vec<&SelectionSet> = match &doc.operations {
        DocumentOperations::Single(op) => vec![&op.node.selection_set.node],
        DocumentOperations::Multiple(ops) => ops
            .iter()
            .filter(|(name, _)| operation_name.map_or(true, |wanted| name.as_str() == wanted))
            .map(|(_, op)| &op.node.selection_set.node)
            .collect(),
    };

    let mut fields = Vec::new();
    let mut visited = HashSet::new();
    for set in selections {
        collect_fields(set, doc, &mut visited, &mut fields);
    }
    fields
}

fn collect_fields<'a>(
    set: &'a SelectionSet,
    doc: &'a ExecutableDocument,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<String>,
) {
    for selection in &set.items {
        match &selection.node {
            Selection::Field(field) => out.push(field.node.name.node.to_string()),
            Selection::InlineFragment(fragment) => {
                collect_fields(&fragment.node.selection_set.node, doc, visited, out)
            }
            Selection::FragmentSpread(spread) => {
                let name = &spread.node.fragment_name.node;
                if !visited.insert(name.as_str()) {
                    continue;
                }
                if let Some(fragment) = doc.fragments.get(name) {
                    collect_fields(&fragment.node.selection_set.node, doc, visited, out);
                }
            }
        }
    }
}
