use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use serde_json::{json, Map, Value};

use super::TriplesEmitter;
use crate::model::vocab::standard::RDF_TYPE;

/// JSON-LD emitter. Triples are grouped into one node object per subject and
/// the whole document (`@context` from the registered prefixes, plus
/// `@graph`) is written on the first [`flush`](TriplesEmitter::flush).
pub struct JsonLdEmitter<W: Write> {
    writer: W,
    count: u64,
    prefixes: BTreeMap<String, String>,
    nodes: Vec<Map<String, Value>>,
    index: HashMap<String, usize>,
    written: bool,
}

impl<W: Write> JsonLdEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            count: 0,
            prefixes: BTreeMap::new(),
            nodes: Vec::new(),
            index: HashMap::new(),
            written: false,
        }
    }

    /// `prefix:local` for the longest registered namespace, else the IRI itself.
    fn compact_iri(&self, iri: &str) -> String {
        let best = self
            .prefixes
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len());
        match best {
            Some((prefix, ns)) if iri.len() > ns.len() => format!("{prefix}:{}", &iri[ns.len()..]),
            _ => iri.to_string(),
        }
    }

    fn node(&mut self, subject: &str) -> &mut Map<String, Value> {
        let next = self.nodes.len();
        let slot = *self.index.entry(subject.to_string()).or_insert(next);
        if slot == next {
            let mut node = Map::new();
            node.insert("@id".to_string(), json!(subject));
            self.nodes.push(node);
        }
        &mut self.nodes[slot]
    }

    /// Add `value` under `key`, turning repeated keys into arrays.
    fn push(&mut self, subject: &str, key: String, value: Value) {
        let node = self.node(subject);
        match node.get_mut(&key) {
            None => {
                node.insert(key, value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = json!([first, value]);
            }
        }
        self.count += 1;
    }

    fn document(&self) -> Value {
        let context: Map<String, Value> = self
            .prefixes
            .iter()
            .map(|(prefix, ns)| (prefix.clone(), json!(ns)))
            .collect();
        let graph: Vec<Value> = self.nodes.iter().cloned().map(Value::Object).collect();
        json!({"@context": context, "@graph": graph})
    }
}

impl<W: Write> TriplesEmitter for JsonLdEmitter<W> {
    fn emit_iri(&mut self, subject: &str, predicate: &str, object: &str) -> io::Result<()> {
        if predicate == RDF_TYPE {
            let kind = self.compact_iri(object);
            self.push(subject, "@type".to_string(), json!(kind));
        } else {
            let key = self.compact_iri(predicate);
            self.push(subject, key, json!({"@id": object}));
        }
        Ok(())
    }

    fn emit_literal(&mut self, subject: &str, predicate: &str, value: &str) -> io::Result<()> {
        let key = self.compact_iri(predicate);
        self.push(subject, key, json!(value));
        Ok(())
    }

    fn emit_typed_literal(
        &mut self,
        subject: &str,
        predicate: &str,
        value: &str,
        datatype: &str,
    ) -> io::Result<()> {
        let key = self.compact_iri(predicate);
        let datatype = self.compact_iri(datatype);
        self.push(subject, key, json!({"@value": value, "@type": datatype}));
        Ok(())
    }

    fn add_prefix(&mut self, prefix: &str, iri: &str) -> io::Result<()> {
        self.prefixes.insert(prefix.to_string(), iri.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.written {
            self.written = true;
            let document = self.document();
            serde_json::to_writer_pretty(&mut self.writer, &document)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()
    }

    fn triple_count(&self) -> u64 {
        self.count
    }
}
