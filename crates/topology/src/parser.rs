// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Parses the effective topology-description XML into a [`TopoElement`]
//! tree (§6 "Topology-description format").
//!
//! Recognized elements: `<topology>`, `<group name="..." n="...">`,
//! `<collection name="...">`, `<task path="...">`. Recognized attributes
//! on group/collection/task: `maxInstancesPerHost`, `wnName`, `groupName`,
//! `zone`, `ncores`, `expendable`. Recognized top-level `<declcollection>`/
//! `<var name="odc_nmin_<Name>" value="<n>"/>` entries feed nMin
//! attachment, done as a post-processing pass once the tree is built
//! (the variable may appear before or after the collection it targets).

use crate::model::{Requirements, TopoElement};
use odc_core::{ErrorCode, OdcError};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

const NMIN_PREFIX: &str = "odc_nmin_";

/// Parsed topology: the element tree plus the raw `odc_nmin_<Name>`
/// variable map, not yet folded into the tree (the index-building step
/// does that, since it also needs `n` to validate `nMin <= n`).
#[derive(Debug, Clone)]
pub struct ParsedTopology {
    pub root: TopoElement,
    pub nmin_vars: HashMap<String, u32>,
}

pub fn parse(xml: &str) -> Result<ParsedTopology, OdcError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut nmin_vars = HashMap::new();
    // Stack of (name, n, children) for open group/collection elements.
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<TopoElement> = None;

    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| parse_err(e.to_string()))?;
        let is_empty = matches!(event, Event::Empty(_));
        match event {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                let local = local_name(&e);
                let attrs = read_attrs(&e)?;
                match local.as_str() {
                    "var" => {
                        if let (Some(name), Some(value)) = (attrs.get("name"), attrs.get("value")) {
                            if let Some(coll) = name.strip_prefix(NMIN_PREFIX) {
                                let n: u32 = value
                                    .parse()
                                    .map_err(|_| parse_err(format!("invalid {name} value {value:?}")))?;
                                nmin_vars.insert(coll.to_string(), n);
                            }
                        }
                    }
                    "group" => {
                        let name = attrs.get("name").cloned().unwrap_or_default();
                        let n: u32 = attrs
                            .get("n")
                            .map(|s| s.parse())
                            .transpose()
                            .map_err(|_| parse_err("invalid group n".to_string()))?
                            .unwrap_or(1);
                        stack.push(OpenElement::Group { name, n, children: Vec::new() });
                    }
                    "collection" => {
                        let name = attrs.get("name").cloned().unwrap_or_default();
                        let requirements = requirements_from_attrs(&attrs)?;
                        stack.push(OpenElement::Collection {
                            name,
                            requirements,
                            tasks: Vec::new(),
                        });
                    }
                    "task" => {
                        let path = attrs
                            .get("path")
                            .cloned()
                            .ok_or_else(|| parse_err("task missing path attribute".to_string()))?;
                        let requirements = requirements_from_attrs(&attrs)?;
                        let task = TopoElement::Task { path, requirements };
                        push_child(&mut stack, &mut root, task)?;
                    }
                    _ => {}
                }

                // <group .../> and <collection .../> (no children) close immediately.
                if is_empty && matches!(local.as_str(), "group" | "collection") {
                    close_top(&mut stack, &mut root)?;
                }
            }
            Event::End(e) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if matches!(local.as_str(), "group" | "collection") {
                    close_top(&mut stack, &mut root)?;
                }
            }
            _ => {}
        }
        buf.clear();
    }

    let root = root.ok_or_else(|| parse_err("topology description has no elements".to_string()))?;
    Ok(ParsedTopology { root, nmin_vars })
}

enum OpenElement {
    Group {
        name: String,
        n: u32,
        children: Vec<TopoElement>,
    },
    Collection {
        name: String,
        requirements: Requirements,
        tasks: Vec<TopoElement>,
    },
}

fn push_child(
    stack: &mut [OpenElement],
    root: &mut Option<TopoElement>,
    child: TopoElement,
) -> Result<(), OdcError> {
    match stack.last_mut() {
        Some(OpenElement::Group { children, .. }) => children.push(child),
        Some(OpenElement::Collection { tasks, .. }) => tasks.push(child),
        None => {
            if root.is_some() {
                return Err(parse_err("topology description has multiple root elements".to_string()));
            }
            *root = Some(child);
        }
    }
    Ok(())
}

fn close_top(stack: &mut Vec<OpenElement>, root: &mut Option<TopoElement>) -> Result<(), OdcError> {
    let open = stack
        .pop()
        .ok_or_else(|| parse_err("unbalanced group/collection close tag".to_string()))?;
    let closed = match open {
        OpenElement::Group { name, n, children } => TopoElement::Group { name, n, children },
        OpenElement::Collection { name, requirements, tasks } => {
            TopoElement::Collection { name, tasks, requirements }
        }
    };
    push_child(stack, root, closed)
}

fn requirements_from_attrs(attrs: &HashMap<String, String>) -> Result<Requirements, OdcError> {
    Ok(Requirements {
        max_instances_per_host: attrs
            .get("maxInstancesPerHost")
            .map(|s| s.parse())
            .transpose()
            .map_err(|_| parse_err("invalid maxInstancesPerHost".to_string()))?,
        wn_name: attrs.get("wnName").cloned(),
        group_name: attrs.get("groupName").cloned(),
        zone: attrs.get("zone").or_else(|| attrs.get("custom.zone")).cloned(),
        ncores: attrs
            .get("ncores")
            .or_else(|| attrs.get("custom.ncores"))
            .map(|s| s.parse())
            .transpose()
            .map_err(|_| parse_err("invalid ncores".to_string()))?,
        expendable: attrs.get("expendable").map(|s| s == "true").unwrap_or(false),
    })
}

fn read_attrs(e: &quick_xml::events::BytesStart) -> Result<HashMap<String, String>, OdcError> {
    let mut out = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| parse_err(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| parse_err(err.to_string()))?
            .to_string();
        out.insert(key, value);
    }
    Ok(out)
}

fn local_name(e: &quick_xml::events::BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn parse_err(details: String) -> OdcError {
    OdcError::new(ErrorCode::TopologyFailed, details)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
