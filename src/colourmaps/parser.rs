//! Palette loading.
//!
//! Accepted forms, tried in this order:
//!
//! - JSON, when the text starts with `[` or `{`
//! - a preset name, optionally prefixed with `@` to drop the preset's
//!   positions so its colours are spread evenly
//! - `position=colour` lines separated by newlines or semicolons, with an
//!   optional `background=colour` line
//! - a list of colours separated by whitespace, `;` or `,`, each optionally
//!   prefixed by a data value as in `(10.5)red`
//!
//! Loading never fails. Fragments that cannot be understood are skipped and
//! the result is padded to two stops.

use serde_json::{Map, Value};
use tracing::debug;

use super::colour::Colour;
use super::colourmap::ColourMap;
use super::presets;

/// One entry of a colour list: an optional anchoring value and the colour
/// text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PaletteToken<'a> {
    pub value: Option<f32>,
    pub colour: &'a str,
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | ';' | ',')
}

/// Split a colour list into tokens. Separators inside parentheses do not
/// split, so `rgba(1, 2, 3, 0.5)` stays whole.
pub(crate) fn tokenize(data: &str) -> Vec<PaletteToken<'_>> {
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in data.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && is_separator(c) {
            if let Some(s) = start.take() {
                words.push(&data[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push(&data[s..]);
    }

    words.into_iter().filter_map(parse_token).collect()
}

fn parse_token(word: &str) -> Option<PaletteToken<'_>> {
    let token = match word.strip_prefix('(') {
        Some(rest) => {
            let (value, colour) = rest.split_once(')')?;
            match value.trim().parse::<f32>() {
                Ok(value) => PaletteToken {
                    value: Some(value),
                    colour: colour.trim(),
                },
                Err(_) => {
                    debug!(token = word, "Skipping palette token with unreadable value");
                    return None;
                }
            }
        }
        None => PaletteToken {
            value: None,
            colour: word,
        },
    };
    (!token.colour.is_empty()).then_some(token)
}

impl ColourMap {
    /// Replace the stops with palette data in any accepted text form.
    ///
    /// Returns whether the data held at least two usable colours. The map
    /// always ends up with at least two stops.
    pub fn load_palette(&mut self, data: &str) -> bool {
        self.clear();
        self.no_values = false;
        self.parse_text(data);
        self.finish_load()
    }

    /// Replace the stops with a JSON palette.
    pub fn load_json(&mut self, json: &Value) -> bool {
        self.clear();
        self.no_values = false;
        self.parse_json(json);
        self.finish_load()
    }

    fn finish_load(&mut self) -> bool {
        let genuine = self.stops.len() >= 2;
        if !genuine {
            debug!(name = %self.name, stops = self.stops.len(), "Palette padded to two stops");
        }
        self.ensure_two_stops();
        self.calibrated = false;
        genuine
    }

    fn parse_text(&mut self, data: &str) {
        let data = data.trim();
        if data.starts_with('[') || data.starts_with('{') {
            match serde_json::from_str::<Value>(data) {
                Ok(json) => self.parse_json(&json),
                Err(e) => debug!(name = %self.name, error = %e, "Palette is not valid JSON"),
            }
        } else if let Some(name) = data.strip_prefix('@') {
            match presets::lookup(name.trim()) {
                Some(preset) => {
                    self.parse_text(&preset);
                    for stop in &mut self.stops {
                        stop.value = None;
                    }
                    self.no_values = false;
                }
                None => debug!(name = %self.name, preset = name, "Unknown palette preset"),
            }
        } else if let Some(preset) = presets::lookup(data) {
            self.parse_text(&preset);
        } else if data.contains('=') {
            self.parse_position_lines(data);
        } else {
            self.parse_colour_list(data);
        }
    }

    fn parse_colour_list(&mut self, data: &str) {
        for token in tokenize(data) {
            match token.colour.parse::<Colour>() {
                Ok(colour) => match token.value {
                    Some(value) => self.add_value(colour, value),
                    None => self.add(colour),
                },
                Err(e) => debug!(name = %self.name, error = %e, "Skipping palette colour"),
            }
        }
    }

    fn parse_position_lines(&mut self, data: &str) {
        self.no_values = true;
        for line in data.split(|c| c == '\n' || c == ';') {
            let line = line.trim();
            let Some((key, spec)) = line.split_once('=') else {
                if !line.is_empty() {
                    debug!(name = %self.name, line, "Skipping palette line without '='");
                }
                continue;
            };
            let key = key.trim();
            let colour = match spec.trim().parse::<Colour>() {
                Ok(colour) => colour,
                Err(e) => {
                    debug!(name = %self.name, error = %e, "Skipping palette line");
                    continue;
                }
            };
            match key.parse::<f32>() {
                Ok(position) if (0.0..=1.0).contains(&position) => self.add_at(colour, position),
                _ if key.eq_ignore_ascii_case("background") => self.background = colour,
                _ => debug!(name = %self.name, line, "Skipping palette line with bad position"),
            }
        }
    }

    fn parse_json(&mut self, json: &Value) {
        match json {
            Value::Array(items) => {
                for item in items {
                    self.parse_json_element(item);
                }
            }
            Value::Object(object) => self.parse_json_object(object),
            Value::String(data) => self.parse_text(data),
            other => debug!(name = %self.name, json = %other, "Unsupported JSON palette"),
        }
    }

    fn parse_json_element(&mut self, item: &Value) {
        match item {
            Value::Array(pair) if pair.len() == 2 => match pair[0].as_f64() {
                Some(position) => match Colour::from_json(&pair[1]) {
                    Ok(colour) => {
                        self.add_at(colour, position as f32);
                        self.no_values = true;
                    }
                    Err(e) => debug!(name = %self.name, error = %e, "Skipping palette entry"),
                },
                None => debug!(name = %self.name, entry = %item, "Skipping palette entry"),
            },
            Value::Array(_) | Value::String(_) => match Colour::from_json(item) {
                Ok(colour) => self.add(colour),
                Err(e) => debug!(name = %self.name, error = %e, "Skipping palette entry"),
            },
            Value::Number(n) => {
                let Some(mut grey) = n.as_f64() else {
                    return;
                };
                if grey <= 1.0 {
                    grey *= 255.0;
                }
                let grey = grey.round().clamp(0.0, 255.0) as u8;
                self.add(Colour::new(grey, grey, grey, grey));
            }
            Value::Object(entry) => {
                let spec = entry.get("colour").or_else(|| entry.get("color"));
                let colour = match spec.map(Colour::from_json) {
                    Some(Ok(colour)) => colour,
                    Some(Err(e)) => {
                        debug!(name = %self.name, error = %e, "Skipping palette entry");
                        return;
                    }
                    None => {
                        debug!(name = %self.name, entry = %item, "Palette entry has no colour");
                        return;
                    }
                };
                if let Some(position) = entry.get("position").and_then(Value::as_f64) {
                    self.add_at(colour, position as f32);
                    self.no_values = true;
                } else if let Some(value) = entry.get("value").and_then(Value::as_f64) {
                    self.add_value(colour, value as f32);
                } else {
                    self.add(colour);
                }
            }
            other => debug!(name = %self.name, entry = %other, "Skipping palette entry"),
        }
    }

    /// A full colour map document: flags, range, background and colours.
    fn parse_json_object(&mut self, object: &Map<String, Value>) {
        if let Some(background) = object.get("background") {
            let parsed = Colour::from_json(background).or_else(|e| match background {
                Value::Array(items) if !items.is_empty() => Colour::from_json(&items[0]),
                _ => Err(e),
            });
            match parsed {
                Ok(colour) => {
                    self.background = colour;
                    self.properties.background = Some(background.clone());
                }
                Err(e) => debug!(name = %self.name, error = %e, "Ignoring palette background"),
            }
        }
        if self.name.is_empty() {
            if let Some(name) = object.get("name").and_then(Value::as_str) {
                self.name = name.to_string();
            }
        }

        let flag = |keys: &[&str]| keys.iter().find_map(|k| object.get(*k)).and_then(json_flag);
        if let Some(log) = flag(&["logscale", "log"]) {
            self.log_scale = log;
            self.properties.logscale = log;
        }
        if let Some(discrete) = flag(&["discrete"]) {
            self.discrete = discrete;
            self.properties.discrete = discrete;
            if self.properties.interpolate.is_none() {
                self.interpolate = !discrete;
            }
        }
        if let Some(interpolate) = flag(&["interpolate"]) {
            self.interpolate = interpolate;
            self.properties.interpolate = Some(interpolate);
        }
        if let Some(locked) = flag(&["locked"]) {
            self.locked = locked;
            self.properties.locked = locked;
        }
        if let Some(range) = object.get("range").and_then(Value::as_array) {
            let bounds = [range.first(), range.get(1)].map(|v| v.and_then(Value::as_f64));
            if let [Some(min), Some(max)] = bounds {
                self.properties.range = Some([min as f32, max as f32]);
            }
        }
        if let Some(minimum) = object.get("minimum").and_then(Value::as_f64) {
            self.minimum = minimum as f32;
        }
        if let Some(maximum) = object.get("maximum").and_then(Value::as_f64) {
            self.maximum = maximum as f32;
        }

        if let Some(colours) = object.get("colours").or_else(|| object.get("colors")) {
            self.parse_json(colours);
        }
    }
}

/// Booleans as JSON booleans, numbers or strings.
fn json_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
