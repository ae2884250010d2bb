use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::camera::CameraBookmark;
use crate::graph::snapshot::{OgNode, OgSnapshot};
use crate::util::now_millis;
use crate::vec3::Vec3;

/// Persistable node form. Projection preserves exactly what was present;
/// absent or wrong-typed fields stay absent, nothing is defaulted here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, rename = "textSize", skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// The single JSON value saved and loaded per graph id: the graph sections
/// at the top level, with the OG snapshot and bookmarks as optional
/// siblings. File imports use the same shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    #[serde(flatten)]
    pub graph: GraphDocument,
    #[serde(
        default,
        rename = "ogSnapshot",
        skip_serializing_if = "Option::is_none"
    )]
    pub og_snapshot: Option<OgSnapshot>,
    #[serde(default, rename = "cameraBookmarks")]
    pub camera_bookmarks: Vec<CameraBookmark>,
}

/// The one place an endpoint id is resolved: accepts a bare id or an
/// object carrying an `id` field. Anything else is treated as absent.
fn endpoint_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Object(_) => value.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number_field(value: &Value, key: &str) -> Option<f32> {
    value.get(key).and_then(Value::as_f64).map(|n| n as f32)
}

/// JavaScript-style truthiness; stored documents carry flags in whatever
/// type the web client last wrote.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn node_record(value: &Value) -> NodeRecord {
    NodeRecord {
        id: string_field(value, "id"),
        color: string_field(value, "color"),
        text_size: number_field(value, "textSize"),
        group: string_field(value, "group"),
        x: number_field(value, "x"),
        y: number_field(value, "y"),
        z: number_field(value, "z"),
    }
}

fn link_record(value: &Value) -> LinkRecord {
    LinkRecord {
        source: value.get("source").and_then(endpoint_id),
        target: value.get("target").and_then(endpoint_id),
        color: string_field(value, "color"),
        thickness: number_field(value, "thickness"),
    }
}

/// Pure projection of an arbitrary payload onto the persistable graph
/// shape. Total: never errors, keeps entry order, performs no
/// deduplication and no defaulting.
pub fn normalize_graph(value: &Value) -> GraphDocument {
    let nodes = value
        .get("nodes")
        .and_then(Value::as_array)
        .map(|nodes| nodes.iter().map(node_record).collect())
        .unwrap_or_default();
    let links = value
        .get("links")
        .and_then(Value::as_array)
        .map(|links| links.iter().map(link_record).collect())
        .unwrap_or_default();
    GraphDocument { nodes, links }
}

pub fn normalize_og_snapshot(value: &Value) -> OgSnapshot {
    let nodes = value
        .get("nodes")
        .and_then(Value::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .map(|n| OgNode {
                    id: string_field(n, "id"),
                    x: number_field(n, "x"),
                    y: number_field(n, "y"),
                    z: number_field(n, "z"),
                })
                .collect()
        })
        .unwrap_or_default();
    let links = value
        .get("links")
        .and_then(Value::as_array)
        .map(|links| links.iter().map(link_record).collect())
        .unwrap_or_default();
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_i64)
        .unwrap_or_else(now_millis);
    OgSnapshot { nodes, links, timestamp }
}

fn vec3_field(value: &Value, key: &str, default: Vec3) -> Vec3 {
    let field = value.get(key);
    let component = |axis: &str, fallback: f32| {
        field
            .and_then(|f| f.get(axis))
            .and_then(Value::as_f64)
            .map(|n| n as f32)
            .unwrap_or(fallback)
    };
    Vec3::new(
        component("x", default.x),
        component("y", default.y),
        component("z", default.z),
    )
}

/// The one normalizer that fully defaults every field, so a bookmark list
/// from any era of saved data comes back usable.
pub fn normalize_camera_bookmarks(value: &Value) -> Vec<CameraBookmark> {
    let Some(list) = value.as_array() else {
        return Vec::new();
    };
    list.iter()
        .enumerate()
        .map(|(index, entry)| CameraBookmark {
            name: string_field(entry, "name")
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("view-{}", index + 1)),
            position: vec3_field(entry, "position", Vec3::new(0.0, 0.0, 400.0)),
            look_at: vec3_field(entry, "lookAt", Vec3::ZERO),
            up: vec3_field(entry, "up", Vec3::UP),
            zoom: number_field(entry, "zoom").unwrap_or(1.0),
            is_orthographic: entry.get("isOrthographic").is_some_and(truthy),
        })
        .collect()
}

pub fn normalize_session_document(value: &Value) -> SessionDocument {
    SessionDocument {
        graph: normalize_graph(value),
        og_snapshot: value.get("ogSnapshot").map(normalize_og_snapshot),
        camera_bookmarks: value
            .get("cameraBookmarks")
            .map(normalize_camera_bookmarks)
            .unwrap_or_default(),
    }
}
