// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Submit Planner: turns a Plugin Runner's stdout into a list of
//! submittable [`SubmitParam`] records, cross-joined with the zones a
//! partition's Session has declared (§4.3).

use odc_core::{ErrorCode, OdcError};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

const RECOGNIZED_KEYS: &[&str] = &[
    "rms",
    "configFile",
    "envFile",
    "agents",
    "slots",
    "requiredSlots",
    "agentGroup",
    "zone",
    "nCores",
];

/// One submittable unit of resources (§4.3 "SubmitParam").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitParam {
    pub rms: Option<String>,
    pub config_file: Option<String>,
    pub env_file: Option<String>,
    pub agents: u32,
    pub slots: u32,
    pub required_slots: u32,
    pub agent_group: Option<String>,
    pub zone: Option<String>,
    pub ncores: Option<u32>,
}

/// One zone group the planner cross-joins against (a simplified view of
/// `odc_core::session::ZoneGroup`, decoupled so this crate does not need
/// `odc-core`'s full Session shape).
#[derive(Debug, Clone)]
pub struct ZoneDemand {
    pub zone: String,
    pub count: u32,
    pub ncores: u32,
    pub agent_group_name: String,
    pub min_agents: Option<u32>,
}

/// Parses the Runner's stdout XML (§4.3 "either a flat set of submission
/// parameters or one or more `<submit>` children").
pub fn parse_plugin_output(xml: &str) -> Result<Vec<SubmitParam>, OdcError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut results = Vec::new();
    let mut stack: Vec<(String, String)> = Vec::new(); // (tag, accumulated text)
    let mut current: HashMap<String, String> = HashMap::new();
    let mut in_submit_children = false;
    let mut depth: u32 = 0;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| xml_err(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "submit" {
                    in_submit_children = true;
                    current.clear();
                } else {
                    stack.push((name, String::new()));
                }
            }
            Event::Text(t) => {
                if let Some((_, text)) = stack.last_mut() {
                    text.push_str(&t.unescape().map_err(|e| xml_err(e.to_string()))?);
                }
            }
            Event::End(e) => {
                depth -= 1;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "submit" {
                    results.push(to_submit_param(&current)?);
                    in_submit_children = false;
                } else if let Some((tag, text)) = stack.pop() {
                    // The outermost wrapper element (e.g. the document
                    // root) is not a submission field and is not
                    // validated against the recognized-key allow-list.
                    if tag == name && depth != 0 {
                        if !RECOGNIZED_KEYS.contains(&tag.as_str()) {
                            return Err(unknown_key(&tag));
                        }
                        current.insert(tag, text);
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if results.is_empty() && !current.is_empty() {
        results.push(to_submit_param(&current)?);
    }
    if results.is_empty() && !in_submit_children {
        return Err(OdcError::new(
            ErrorCode::ResourcePluginFailed,
            "plugin output contained no submission parameters".to_string(),
        ));
    }

    Ok(results)
}

fn to_submit_param(fields: &HashMap<String, String>) -> Result<SubmitParam, OdcError> {
    Ok(SubmitParam {
        rms: fields.get("rms").cloned(),
        config_file: fields.get("configFile").cloned(),
        env_file: fields.get("envFile").cloned(),
        agents: parse_u32(fields.get("agents"))?,
        slots: parse_u32(fields.get("slots"))?,
        required_slots: parse_u32(fields.get("requiredSlots"))?,
        agent_group: fields.get("agentGroup").cloned(),
        zone: fields.get("zone").cloned(),
        ncores: fields.get("nCores").map(|s| s.parse()).transpose().map_err(|_| {
            OdcError::new(ErrorCode::ResourcePluginFailed, "invalid nCores value".to_string())
        })?,
    })
}

fn parse_u32(value: Option<&String>) -> Result<u32, OdcError> {
    match value {
        None => Ok(0),
        Some(s) => s
            .parse()
            .map_err(|_| OdcError::new(ErrorCode::ResourcePluginFailed, format!("invalid integer {s:?}"))),
    }
}

fn unknown_key(key: &str) -> OdcError {
    OdcError::new(ErrorCode::ResourcePluginFailed, format!("unrecognized plugin output key {key:?}"))
}

fn xml_err(details: String) -> OdcError {
    OdcError::new(ErrorCode::ResourcePluginFailed, details)
}

/// Cross-joins parsed submission parameters with the Session's declared
/// zones: one `SubmitParam` per distinct `nCores` bucket within a zone,
/// inheriting `configFile`/`envFile` from the matching zone-level
/// default and carrying `minAgents` when a zone matches (§4.3).
///
/// Guarantees the concatenation of `agents` across the returned records
/// equals the total requested agent count for each zone.
pub fn cross_join_zones(base: &[SubmitParam], zones: &[ZoneDemand]) -> Vec<SubmitParam> {
    let mut out = Vec::new();
    for zone in zones {
        let default = base.iter().find(|p| p.zone.as_deref() == Some(zone.zone.as_str()));
        let config_file = default.and_then(|p| p.config_file.clone());
        let env_file = default.and_then(|p| p.env_file.clone());
        let rms = default.and_then(|p| p.rms.clone());

        out.push(SubmitParam {
            rms,
            config_file,
            env_file,
            agents: zone.count,
            slots: zone.ncores,
            required_slots: zone.min_agents.unwrap_or(zone.count) * zone.ncores,
            agent_group: Some(zone.agent_group_name.clone()),
            zone: Some(zone.zone.clone()),
            ncores: Some(zone.ncores),
        });
    }
    out
}

#[cfg(test)]
#[path = "submit_planner_tests.rs"]
mod tests;
