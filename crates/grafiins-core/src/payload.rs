//! Payload capability contract and the built-in vertex/edge payloads.
//!
//! The graph core never looks inside a payload. Export only needs two
//! things from it: a default value (used to derive the column schema) and an
//! ordered list of `(field name, value)` pairs.

/// Ordered `(field name, value)` pairs. Insertion order is the column order.
pub type Fields = Vec<(String, String)>;

/// Column name of an edge's source vertex in exported edge rows.
pub const EDGE_SRC_FIELD: &str = "src_vertex_i";

/// Column name of an edge's destination vertex in exported edge rows.
pub const EDGE_DST_FIELD: &str = "dst_vertex_i";

/// A payload that can be written as one table row.
///
/// `fields` must return the same names in the same order on every call and
/// for every value of the type; [`Serializable::field_names`] derives the
/// table header from `Self::default()`.
pub trait Serializable: Default {
    fn fields(&self) -> Fields;

    /// Column names, read from a default-constructed value.
    #[must_use]
    fn field_names() -> Vec<String> {
        Self::default()
            .fields()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }
}

impl Serializable for () {
    fn fields(&self) -> Fields {
        Vec::new()
    }
}

/// A bare label.
impl Serializable for String {
    fn fields(&self) -> Fields {
        vec![("label".to_string(), self.clone())]
    }
}

/// Labelled vertex with graphviz rendering hints.
///
/// The hints are carried through export untouched; nothing in this crate
/// renders them.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    pub label: String,
    pub graphviz_shape: String,
    pub graphviz_cluster: String,
    pub graphviz_width: f64,
    pub graphviz_height: f64,
}

impl VertexData {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

impl Default for VertexData {
    fn default() -> Self {
        Self {
            label: String::new(),
            graphviz_shape: "circle".to_string(),
            graphviz_cluster: String::new(),
            graphviz_width: 0.0,
            graphviz_height: 0.0,
        }
    }
}

impl Serializable for VertexData {
    fn fields(&self) -> Fields {
        vec![
            ("label".to_string(), self.label.clone()),
            ("graphviz_shape".to_string(), self.graphviz_shape.clone()),
            ("graphviz_cluster".to_string(), self.graphviz_cluster.clone()),
            ("graphviz_width".to_string(), self.graphviz_width.to_string()),
            ("graphviz_height".to_string(), self.graphviz_height.to_string()),
        ]
    }
}

/// Labelled edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeData {
    pub label: String,
}

impl EdgeData {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Serializable for EdgeData {
    fn fields(&self) -> Fields {
        vec![("label".to_string(), self.label.clone())]
    }
}
