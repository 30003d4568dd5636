//! On-disk parsing and serialisation for the webhook configuration file
//! (spec §4.3, §6).
//!
//! Canonical form, one record per line:
//! `<service>_<token>|<alignment>|<fields>|<template>`
//!
//! Two legacy forms must also be read:
//! - `<service>_<token> = <fields>::<template>` (no alignment)
//! - `<service> = <fields>::<template>` (no token; synthetic token `legacy`)
//!
//! Every record is normalised to the canonical pipe form on the next
//! rewrite — the bare legacy line syntax is never reissued.

use std::collections::HashSet;

use crate::error::GatewayError;
use crate::models::{Alignment, AlignmentDto, ConfigRecord};

pub const LEGACY_TOKEN: &str = "legacy";
const HEADER: &str = "[webhooks]";

pub fn parse(contents: &str) -> Result<Vec<ConfigRecord>, GatewayError> {
    let mut records = Vec::new();
    let mut bare_legacy_services: HashSet<String> = HashSet::new();

    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line == HEADER || line.starts_with('#') {
            continue;
        }

        let is_bare_legacy = !line.contains('|') && raw_line_is_bare_legacy(line);
        let record = parse_line(line)?;
        if is_bare_legacy && !bare_legacy_services.insert(record.service.clone()) {
            return Err(GatewayError::BadConfig(format!(
                "duplicate legacy configuration line for service '{}'",
                record.service
            )));
        }
        records.push(record);
    }
    Ok(records)
}

fn raw_line_is_bare_legacy(line: &str) -> bool {
    // A bare legacy line has no `_` between service and the ` = ` separator,
    // i.e. it is the `<service> = ...` form rather than `<service>_<token> = ...`.
    if let Some((left, _)) = line.split_once('=') {
        !left.trim().contains('_')
    } else {
        false
    }
}

fn parse_line(line: &str) -> Result<ConfigRecord, GatewayError> {
    if line.contains('|') {
        parse_canonical_line(line)
    } else if line.contains('=') {
        parse_legacy_line(line)
    } else {
        Err(GatewayError::BadConfig(format!(
            "unrecognised configuration line: {line}"
        )))
    }
}

fn parse_canonical_line(line: &str) -> Result<ConfigRecord, GatewayError> {
    let mut parts = line.splitn(4, '|');
    let key = parts.next().unwrap_or_default();
    let alignment = parts.next().unwrap_or_default();
    let fields = parts.next().unwrap_or_default();
    let template = parts.next().unwrap_or_default();

    let (service, token) = split_service_token(key)
        .ok_or_else(|| GatewayError::BadConfig(format!("missing '_<token>' suffix: {key}")))?;
    let alignment: Alignment = alignment
        .parse()
        .map_err(|_| GatewayError::BadConfig(format!("invalid alignment: {alignment}")))?;

    Ok(ConfigRecord {
        service,
        token,
        alignment: alignment.into(),
        fields: fields.to_string(),
        template: template.to_string(),
    })
}

fn parse_legacy_line(line: &str) -> Result<ConfigRecord, GatewayError> {
    let (key, rest) = line
        .split_once('=')
        .ok_or_else(|| GatewayError::BadConfig(format!("malformed legacy line: {line}")))?;
    let key = key.trim();
    let rest = rest.trim();
    let (fields, template) = rest
        .split_once("::")
        .ok_or_else(|| GatewayError::BadConfig(format!("malformed legacy line: {line}")))?;

    let (service, token) = match split_service_token(key) {
        Some((service, token)) => (service, token),
        None => (key.to_string(), LEGACY_TOKEN.to_string()),
    };

    Ok(ConfigRecord {
        service,
        token,
        alignment: Alignment::None.into(),
        fields: fields.to_string(),
        template: template.to_string(),
    })
}

/// Split a `<service>_<token>` key. The token is always 32 characters, so
/// the split point is unambiguous even if the service name itself
/// contains underscores.
fn split_service_token(key: &str) -> Option<(String, String)> {
    const TOKEN_LEN: usize = 32;
    if key.len() <= TOKEN_LEN + 1 {
        return None;
    }
    let split_at = key.len() - TOKEN_LEN;
    let (service_part, token_part) = key.split_at(split_at);
    let service = service_part.strip_suffix('_')?;
    if service.is_empty() || token_part.len() != TOKEN_LEN {
        return None;
    }
    Some((service.to_string(), token_part.to_string()))
}

pub fn serialise(records: &[ConfigRecord]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for record in records {
        let alignment: AlignmentDto = record.alignment;
        out.push_str(&format!(
            "{}_{}|{}|{}|{}\n",
            record.service,
            record.token,
            String::from(alignment),
            record.fields,
            record.template,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_canonical_record() {
        let record = ConfigRecord {
            service: "github".into(),
            token: "A".repeat(32),
            alignment: Alignment::Device(24).into(),
            fields: "action,repo{name}".into(),
            template: "$action$ on $repo.name$".into(),
        };
        let serialised = serialise(std::slice::from_ref(&record));
        let parsed = parse(&serialised).unwrap();
        assert_eq!(parsed, vec![record]);
    }

    #[test]
    fn parses_legacy_line_with_token() {
        let token = "A".repeat(32);
        let line = format!("[webhooks]\ngithub_{token} = action::$action$\n");
        let parsed = parse(&line).unwrap();
        assert_eq!(parsed[0].service, "github");
        assert_eq!(parsed[0].token, token);
        assert_eq!(parsed[0].alignment, Alignment::None.into());
    }

    #[test]
    fn parses_bare_legacy_line_with_synthetic_token() {
        let parsed = parse("[webhooks]\nstripe = amount::$amount$\n").unwrap();
        assert_eq!(parsed[0].service, "stripe");
        assert_eq!(parsed[0].token, LEGACY_TOKEN);
    }
}
