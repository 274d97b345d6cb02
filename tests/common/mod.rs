//! In-memory GLB fixtures for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};

const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;
const FLOAT: u32 = 5126;

/// Builds small GLB documents with nodes, animation channels and skins
#[derive(Default)]
pub struct GlbBuilder {
    bin: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    nodes: Vec<Value>,
    samplers: Vec<Value>,
    channels: Vec<Value>,
    skins: Vec<Value>,
    animation_name: Option<String>,
    extensions: serde_json::Map<String, Value>,
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index
    pub fn node(&mut self, name: &str) -> usize {
        self.nodes.push(json!({ "name": name }));
        self.nodes.len() - 1
    }

    /// Add a node without a name and return its index
    pub fn unnamed_node(&mut self) -> usize {
        self.nodes.push(json!({}));
        self.nodes.len() - 1
    }

    /// Add a node with children and return its index
    pub fn parent_node(&mut self, name: &str, children: &[usize]) -> usize {
        self.nodes.push(json!({ "name": name, "children": children }));
        self.nodes.len() - 1
    }

    pub fn animation_name(&mut self, name: &str) -> &mut Self {
        self.animation_name = Some(name.to_string());
        self
    }

    /// Add an animation channel targeting `node`
    pub fn channel(&mut self, node: usize, path: &str, times: &[f32], values: &[f32]) -> &mut Self {
        self.channel_with(node, path, times, values, "LINEAR")
    }

    pub fn channel_with(
        &mut self,
        node: usize,
        path: &str,
        times: &[f32],
        values: &[f32],
        interpolation: &str,
    ) -> &mut Self {
        let input = self.accessor(times, "SCALAR", 1, true);
        let components = match path {
            "rotation" => 4,
            "weights" => 1,
            _ => 3,
        };
        let ty = match components {
            4 => "VEC4",
            3 => "VEC3",
            _ => "SCALAR",
        };
        let output = self.accessor(values, ty, components, false);

        self.samplers.push(json!({
            "input": input,
            "output": output,
            "interpolation": interpolation,
        }));
        self.channels.push(json!({
            "sampler": self.samplers.len() - 1,
            "target": { "node": node, "path": path },
        }));
        self
    }

    pub fn skin(&mut self, joints: &[usize]) -> &mut Self {
        self.skins.push(json!({ "joints": joints }));
        self
    }

    /// Add a root-level extension object
    pub fn extension(&mut self, name: &str, value: Value) -> &mut Self {
        self.extensions.insert(name.to_string(), value);
        self
    }

    fn accessor(&mut self, data: &[f32], ty: &str, components: usize, bounds: bool) -> usize {
        let offset = self.bin.len();
        for value in data {
            self.bin.extend_from_slice(&value.to_le_bytes());
        }
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": data.len() * 4,
        }));

        let mut accessor = json!({
            "bufferView": self.buffer_views.len() - 1,
            "componentType": FLOAT,
            "count": data.len() / components,
            "type": ty,
        });
        if bounds {
            let min = data.iter().copied().fold(f32::INFINITY, f32::min);
            let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            accessor["min"] = json!([min]);
            accessor["max"] = json!([max]);
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// The GLB JSON document
    pub fn document(&self) -> Value {
        let mut doc = json!({ "asset": { "version": "2.0" } });
        if !self.nodes.is_empty() {
            doc["nodes"] = json!(self.nodes);
        }
        if !self.bin.is_empty() {
            doc["buffers"] = json!([{ "byteLength": self.bin.len() }]);
            doc["bufferViews"] = json!(self.buffer_views);
            doc["accessors"] = json!(self.accessors);
        }
        if !self.channels.is_empty() {
            let mut animation = json!({
                "channels": self.channels,
                "samplers": self.samplers,
            });
            if let Some(name) = &self.animation_name {
                animation["name"] = json!(name);
            }
            doc["animations"] = json!([animation]);
        }
        if !self.skins.is_empty() {
            doc["skins"] = json!(self.skins);
        }
        if !self.extensions.is_empty() {
            doc["extensionsUsed"] = json!(self.extensions.keys().collect::<Vec<_>>());
            doc["extensions"] = Value::Object(self.extensions.clone());
        }
        doc
    }

    /// Assemble the GLB container
    pub fn build(&self) -> Vec<u8> {
        let mut json_chunk = serde_json::to_vec(&self.document()).unwrap();
        while json_chunk.len() % 4 != 0 {
            json_chunk.push(b' ');
        }
        let mut bin_chunk = self.bin.clone();
        while bin_chunk.len() % 4 != 0 {
            bin_chunk.push(0);
        }

        let mut total = 12 + 8 + json_chunk.len();
        if !bin_chunk.is_empty() {
            total += 8 + bin_chunk.len();
        }

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());

        out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(&json_chunk);

        if !bin_chunk.is_empty() {
            out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
            out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
            out.extend_from_slice(&bin_chunk);
        }
        out
    }
}

/// A GLB with one named node rotating from identity to a quarter turn
pub fn rotating_glb() -> Vec<u8> {
    let mut builder = GlbBuilder::new();
    let arm = builder.node("arm");
    builder.animation_name("swing").channel(
        arm,
        "rotation",
        &[0.0, 1.5],
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.70710677, 0.70710677],
    );
    builder.build()
}

/// A GLB with nodes but no animations
pub fn static_glb() -> Vec<u8> {
    let mut builder = GlbBuilder::new();
    builder.node("root");
    builder.build()
}
