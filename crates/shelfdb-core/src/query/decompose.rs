//! Request decomposition.
//!
//! Turns a named request, in the context of its enclosing document, into a
//! single [`SqlFragment`] join tree. A request either names a model
//! directly, or names another request in the same document (`subgraph`)
//! plus a relation to traverse from it; subgraph references are resolved
//! recursively with a ledger that assigns aliases and rejects reference
//! cycles before recursing into them.

use super::fragment::SqlFragment;
use super::where_clause::desugar;
use crate::catalog::Registry;
use crate::error::Error;
use shelfdb_proto::{QueryDocument, QueryRequest};

/// Decompose one request into its SQL fragment tree.
pub fn decompose(
    request: &QueryRequest,
    document: &QueryDocument,
    registry: &Registry,
) -> Result<SqlFragment, Error> {
    let mut ledger = Vec::new();
    decompose_with_ledger(request, document, registry, &mut ledger)
}

fn decompose_with_ledger(
    request: &QueryRequest,
    document: &QueryDocument,
    registry: &Registry,
    ledger: &mut Vec<String>,
) -> Result<SqlFragment, Error> {
    if request.relation.is_some() {
        if request.subgraph.is_some() {
            return decompose_subgraph(request, document, registry, ledger);
        }
        return decompose_relation(request, registry, ledger);
    }

    if request.model.is_some() {
        return decompose_direct(request, registry, ledger);
    }

    Err(Error::InvalidInputFormat(
        "must supply either model or subgraph fields".to_string(),
    ))
}

/// Reserve the next positional alias for a fragment with no subgraph name.
fn next_alias(ledger: &mut Vec<String>) -> String {
    ledger.push(String::new());
    format!("alias{}", ledger.len())
}

fn decompose_direct(
    request: &QueryRequest,
    registry: &Registry,
    ledger: &mut Vec<String>,
) -> Result<SqlFragment, Error> {
    let model = request.model.as_deref().unwrap_or_default();
    let entity = registry.lookup(model)?;

    let mut frag = SqlFragment::new(entity.table.clone(), next_alias(ledger));
    frag.where_clauses = desugar(&request.where_clauses, &entity);
    frag.limit = request.limit;
    frag.offset = request.offset;
    frag.order = request.order.clone();
    frag.target = Some(entity);

    Ok(frag)
}

fn decompose_relation(
    request: &QueryRequest,
    registry: &Registry,
    ledger: &mut Vec<String>,
) -> Result<SqlFragment, Error> {
    let relation_name = request.relation.as_deref().unwrap_or_default();
    let model = request.model.as_deref().unwrap_or_default();
    let rel_entity = registry.lookup(model)?;

    let Some(relation) = rel_entity.relation(relation_name) else {
        return Err(Error::InvalidInputFormat(format!(
            "relation ({relation_name}) does not exist"
        )));
    };
    let relation = relation.clone();
    let target = registry.lookup(&relation.target)?;

    // The named model carries the filters; it joins under the relation
    // target we actually select from.
    let child = decompose_direct(request, registry, ledger)?;

    let mut frag = SqlFragment::new(target.table.clone(), next_alias(ledger));
    frag.limit = request.limit;
    frag.offset = request.offset;
    frag.order = request.order.clone();
    frag.target = Some(target);
    frag.join_on(child, relation.target_column, relation.self_column);

    Ok(frag)
}

fn decompose_subgraph(
    request: &QueryRequest,
    document: &QueryDocument,
    registry: &Registry,
    ledger: &mut Vec<String>,
) -> Result<SqlFragment, Error> {
    let subgraph_name = request.subgraph.as_deref().unwrap_or_default();
    let relation_name = request.relation.as_deref().unwrap_or_default();

    let Some(subgraph_req) = document.get(subgraph_name) else {
        return Err(Error::InvalidInputFormat(format!(
            "referenced subgraph ({subgraph_name}) does not exist"
        )));
    };

    // Record the reference before recursing; a request chain that returns
    // to an already-seen name would otherwise never terminate.
    if ledger.iter().any(|seen| seen == subgraph_name) {
        return Err(Error::InvalidInputFormat(
            "cyclic subgraph reference".to_string(),
        ));
    }
    ledger.push(subgraph_name.to_string());
    let alias = format!("alias{}", ledger.len());

    let subgraph_join = decompose_with_ledger(subgraph_req, document, registry, ledger)?;

    // Resolve the relation against the entity the subgraph actually
    // selects, so chained subgraph references traverse correctly.
    let ancestor = subgraph_join
        .target
        .clone()
        .ok_or_else(|| Error::InvalidInputFormat("subgraph resolves to no model".to_string()))?;

    if let Some(bridge) = ancestor.bridge(relation_name) {
        let bridge = bridge.clone();
        let bridge_entity = registry.lookup(&bridge.bridge)?;
        let target = registry.lookup(&bridge.target)?;

        let mut bridge_frag = SqlFragment::new(bridge_entity.table.clone(), next_alias(ledger));
        bridge_frag.target = Some(bridge_entity);
        bridge_frag.join_on(
            subgraph_join,
            bridge.bridge_to_self,
            ancestor.primary_key.clone(),
        );

        let mut frag = SqlFragment::new(target.table.clone(), alias);
        frag.where_clauses = desugar(&request.where_clauses, &target);
        frag.limit = request.limit;
        frag.offset = request.offset;
        frag.order = request.order.clone();
        frag.target = Some(target.clone());
        frag.join_on(bridge_frag, target.primary_key.clone(), bridge.bridge_to_target);

        return Ok(frag);
    }

    if let Some(relation) = ancestor.relation(relation_name) {
        let relation = relation.clone();
        let target = registry.lookup(&relation.target)?;

        let mut frag = SqlFragment::new(target.table.clone(), alias);
        frag.where_clauses = desugar(&request.where_clauses, &target);
        frag.limit = request.limit;
        frag.offset = request.offset;
        frag.order = request.order.clone();
        frag.target = Some(target);
        frag.join_on(subgraph_join, relation.target_column, relation.self_column);

        return Ok(frag);
    }

    Err(Error::InvalidInputFormat(format!(
        "relation ({relation_name}) does not exist on {}",
        ancestor.name
    )))
}
