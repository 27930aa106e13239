// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::*;

use std::ffi::{c_char, CStr, OsStr};
use std::fmt::Display;
use std::mem::ManuallyDrop;
use std::os::unix::ffi::OsStrExt;
use std::ptr::null_mut;

/// Logs the error (if any) and converts the result into a success flag.
fn report<T, E: Display>(operation: &str, result: Result<T, E>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            log::error!("{operation}: {e}");
            false
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_new() -> *mut Graph {
    Box::into_raw(Box::<Graph>::default())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_delete(ptr: *mut Graph) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_node_count(graph: *const Graph) -> usize {
    graph.as_ref().map(|g| g.node_count()).unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_edge_count(graph: *const Graph) -> usize {
    graph.as_ref().map(|g| g.edge_count()).unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_count_oneway_edges(graph: *const Graph) -> usize {
    graph.as_ref().map(edit::count_oneway_edges).unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_count_bidirectional_edges(graph: *const Graph) -> usize {
    graph
        .as_ref()
        .map(edit::count_bidirectional_edges)
        .unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_get_node(
    graph: *const Graph,
    id: i64,
    out_node: *mut Node,
) -> bool {
    match (graph.as_ref().and_then(|g| g.find_node(id)), out_node.as_mut()) {
        (Some(node), Some(out)) => {
            *out = node;
            true
        }
        _ => false,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_get_node_at(
    graph: *const Graph,
    index: usize,
    out_node: *mut Node,
) -> bool {
    match (graph.as_ref().and_then(|g| g.nodes().get(index)), out_node.as_mut()) {
        (Some(node), Some(out)) => {
            *out = *node;
            true
        }
        _ => false,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_get_edge_at(
    graph: *const Graph,
    index: usize,
    out_edge: *mut Edge,
) -> bool {
    match (graph.as_ref().and_then(|g| g.edges().get(index)), out_edge.as_mut()) {
        (Some(edge), Some(out)) => {
            *out = *edge;
            true
        }
        _ => false,
    }
}

#[derive(Copy, Clone)]
#[repr(C)]
pub enum COsmFormat {
    Unknown = 0,
    Xml = 1,
    XmlGz = 2,
    XmlBz2 = 3,
}

impl From<COsmFormat> for osm::FileFormat {
    fn from(value: COsmFormat) -> Self {
        match value {
            COsmFormat::Unknown => osm::FileFormat::Unknown,
            COsmFormat::Xml => osm::FileFormat::Xml,
            COsmFormat::XmlGz => osm::FileFormat::XmlGz,
            COsmFormat::XmlBz2 => osm::FileFormat::XmlBz2,
        }
    }
}

#[repr(C)]
pub struct COsmOptions {
    pub format: COsmFormat,
    pub strict: bool,
}

impl From<&COsmOptions> for osm::Options {
    fn from(value: &COsmOptions) -> Self {
        osm::Options {
            file_format: value.format.into(),
            strict: value.strict,
        }
    }
}

/// Converts optional C options into [osm::Options], falling back to the defaults on NULL.
unsafe fn options_from_c(c_options: *const COsmOptions) -> osm::Options {
    c_options.as_ref().map(Into::into).unwrap_or_default()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_add_from_osm_file(
    graph: *mut Graph,
    c_options: *const COsmOptions,
    c_filename: *const c_char,
) -> bool {
    if let (Some(graph), false) = (graph.as_mut(), c_filename.is_null()) {
        let options = options_from_c(c_options);
        let filename = OsStr::from_bytes(CStr::from_ptr(c_filename).to_bytes());
        report(
            "loading map file",
            osm::add_features_from_file(graph, &options, filename),
        )
    } else {
        false
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_add_from_osm_memory(
    graph: *mut Graph,
    c_options: *const COsmOptions,
    content: *const u8,
    content_len: usize,
) -> bool {
    if let (Some(graph), false) = (graph.as_mut(), content.is_null()) {
        let options = options_from_c(c_options);
        let content = std::slice::from_raw_parts(content, content_len);
        report(
            "loading map data",
            osm::add_features_from_buffer(graph, &options, content),
        )
    } else {
        false
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_save_to_osm_file(
    graph: *const Graph,
    c_filename: *const c_char,
) -> bool {
    if let (Some(graph), false) = (graph.as_ref(), c_filename.is_null()) {
        let filename = OsStr::from_bytes(CStr::from_ptr(c_filename).to_bytes());
        report(
            "saving map file",
            osm::save_graph_to_file(graph, filename),
        )
    } else {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum CPathResultType {
    Found = 0,
    NoPath = 1,
    EmptyGraph = 2,
    InvalidReference = 3,
}

/// Outcome of a shortest path query. `nodes` is only set for [CPathResultType::Found],
/// `invalid_node_id` only for [CPathResultType::InvalidReference].
///
/// Must be released with [waygraph_path_result_delete].
#[repr(C)]
pub struct CPathResult {
    pub type_: CPathResultType,
    pub nodes: *mut i64,
    pub len: usize,
    pub capacity: usize,
    pub total_distance: f64,
    pub invalid_node_id: i64,
}

impl CPathResult {
    fn empty(type_: CPathResultType) -> Self {
        Self {
            type_,
            nodes: null_mut(),
            len: 0,
            capacity: 0,
            total_distance: -1.0,
            invalid_node_id: 0,
        }
    }

    fn found(path: Vec<i64>, total_distance: f64) -> Self {
        let mut path = ManuallyDrop::new(path);
        Self {
            type_: CPathResultType::Found,
            nodes: path.as_mut_ptr(),
            len: path.len(),
            capacity: path.capacity(),
            total_distance,
            invalid_node_id: 0,
        }
    }
}

impl From<Result<PathResult, RouteError>> for CPathResult {
    fn from(value: Result<PathResult, RouteError>) -> Self {
        match value {
            Ok(r) if r.success => CPathResult::found(r.path, r.total_distance),
            Ok(_) => CPathResult::empty(CPathResultType::NoPath),
            Err(RouteError::EmptyGraph) => CPathResult::empty(CPathResultType::EmptyGraph),
            Err(RouteError::InvalidReference(id)) => CPathResult {
                invalid_node_id: id,
                ..CPathResult::empty(CPathResultType::InvalidReference)
            },
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_graph_shortest_path(
    graph: *const Graph,
    from_id: i64,
    to_id: i64,
) -> CPathResult {
    match graph.as_ref() {
        Some(graph) => shortest_path(graph, from_id, to_id).into(),
        None => CPathResult::empty(CPathResultType::EmptyGraph),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_path_result_delete(result: CPathResult) {
    if !result.nodes.is_null() {
        drop(Vec::from_raw_parts(
            result.nodes,
            result.len,
            result.capacity,
        ));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_edit_state_new(graph: *const Graph) -> *mut EditState {
    let state = graph
        .as_ref()
        .map(EditState::from_graph)
        .unwrap_or_default();
    Box::into_raw(Box::new(state))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_edit_state_delete(ptr: *mut EditState) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_edit_state_sync(state: *mut EditState, graph: *const Graph) {
    if let (Some(state), Some(graph)) = (state.as_mut(), graph.as_ref()) {
        state.sync(graph);
    }
}

/// Creates a node and stores its id in `out_id` (which may be NULL).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_create_node(
    graph: *mut Graph,
    state: *mut EditState,
    lat: f64,
    lon: f64,
    out_id: *mut i64,
) -> bool {
    if let (Some(graph), Some(state)) = (graph.as_mut(), state.as_mut()) {
        let result = edit::create_node_at(graph, state, lat, lon);
        if let (Ok(id), Some(out)) = (&result, out_id.as_mut()) {
            *out = *id;
        }
        report("creating node", result)
    } else {
        false
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_can_delete(graph: *const Graph, id: i64) -> bool {
    graph
        .as_ref()
        .map(|g| edit::can_delete(g, id))
        .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_delete_node(
    graph: *mut Graph,
    state: *mut EditState,
    id: i64,
) -> bool {
    if let (Some(graph), Some(state)) = (graph.as_mut(), state.as_mut()) {
        report("deleting node", edit::delete_node(graph, state, id))
    } else {
        false
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_nodes_connected(graph: *const Graph, from_id: i64, to_id: i64) -> bool {
    graph
        .as_ref()
        .map(|g| edit::nodes_are_connected(g, from_id, to_id))
        .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_connect(
    graph: *mut Graph,
    state: *mut EditState,
    from_id: i64,
    to_id: i64,
) -> bool {
    if let (Some(graph), Some(state)) = (graph.as_mut(), state.as_mut()) {
        report("connecting nodes", edit::connect(graph, state, from_id, to_id))
    } else {
        false
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_disconnect(
    graph: *mut Graph,
    state: *mut EditState,
    from_id: i64,
    to_id: i64,
) -> bool {
    if let (Some(graph), Some(state)) = (graph.as_mut(), state.as_mut()) {
        report(
            "disconnecting nodes",
            edit::disconnect(graph, state, from_id, to_id),
        )
    } else {
        false
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_set_edge_bidirectional(
    graph: *mut Graph,
    from_id: i64,
    to_id: i64,
    bidirectional: bool,
) -> bool {
    if let Some(graph) = graph.as_mut() {
        report(
            "changing edge direction",
            edit::set_edge_bidirectional(graph, from_id, to_id, bidirectional),
        )
    } else {
        false
    }
}

#[derive(Copy, Clone)]
#[repr(C)]
pub enum CDirection {
    Forward = 0,
    Bidirectional = 1,
    Reverse = 2,
}

impl From<CDirection> for Direction {
    fn from(value: CDirection) -> Self {
        match value {
            CDirection::Forward => Direction::Forward,
            CDirection::Bidirectional => Direction::Bidirectional,
            CDirection::Reverse => Direction::Reverse,
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_set_connection_direction(
    graph: *mut Graph,
    state: *mut EditState,
    node1: i64,
    node2: i64,
    direction: CDirection,
) -> bool {
    if let (Some(graph), Some(state)) = (graph.as_mut(), state.as_mut()) {
        report(
            "changing connection direction",
            edit::set_connection_direction(graph, state, node1, node2, direction.into()),
        )
    } else {
        false
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn waygraph_earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    earth_distance(lat1, lon1, lat2, lon2)
}
