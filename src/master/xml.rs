// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Recursive-descent parser for `<methodResponse>` documents over the value
//! subset of [`crate::master::value::Value`]. Tolerates exactly that subset
//! plus untyped `<value>` text, which the grammar's string production covers.

use anyhow::{Result, bail, ensure};

use crate::master::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Ok(Value),
    Fault(Value),
}

pub fn parse_method_response(xml: &str) -> Result<MethodResponse> {
    let mut r = Reader::new(xml);
    r.skip_prolog();
    r.expect_open("methodResponse")?;
    let response = if r.try_open("fault") {
        let value = r.parse_value()?;
        r.expect_close("fault")?;
        MethodResponse::Fault(value)
    } else {
        r.expect_open("params")?;
        r.expect_open("param")?;
        let value = r.parse_value()?;
        r.expect_close("param")?;
        r.expect_close("params")?;
        MethodResponse::Ok(value)
    };
    r.expect_close("methodResponse")?;
    Ok(response)
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn skip_prolog(&mut self) {
        self.skip_ws();
        if self.rest().starts_with("<?") {
            if let Some(end) = self.rest().find("?>") {
                self.pos += end + 2;
            }
        }
    }

    /// Consume `<tag>` if it is next; whitespace before it is skipped either
    /// way.
    fn try_open(&mut self, tag: &str) -> bool {
        self.skip_ws();
        let opening = format!("<{tag}>");
        if self.rest().starts_with(opening.as_str()) {
            self.pos += opening.len();
            true
        } else {
            false
        }
    }

    fn expect_open(&mut self, tag: &str) -> Result<()> {
        ensure!(
            self.try_open(tag),
            "bad XML-RPC response: expected <{tag}> near {:?}",
            self.context()
        );
        Ok(())
    }

    fn expect_close(&mut self, tag: &str) -> Result<()> {
        self.skip_ws();
        let closing = format!("</{tag}>");
        ensure!(
            self.rest().starts_with(closing.as_str()),
            "bad XML-RPC response: expected </{tag}> near {:?}",
            self.context()
        );
        self.pos += closing.len();
        Ok(())
    }

    /// Raw character data up to the next `<`, entities decoded.
    fn read_text(&mut self) -> Result<String> {
        let end = self.rest().find('<').unwrap_or(self.rest().len());
        let raw = &self.rest()[..end];
        self.pos += end;
        unescape(raw)
    }

    fn context(&self) -> String {
        self.rest().chars().take(40).collect()
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.expect_open("value")?;
        let value = if self.try_open("int") {
            let v = self.parse_scalar::<i32>("int")?;
            Value::Int(v)
        } else if self.try_open("i4") {
            let v = self.parse_scalar::<i32>("i4")?;
            Value::Int(v)
        } else if self.try_open("double") {
            let v = self.parse_scalar::<f64>("double")?;
            Value::Double(v)
        } else if self.try_open("boolean") {
            let text = self.read_text()?;
            let v = match text.trim() {
                "1" => true,
                "0" => false,
                other => bail!("bad XML-RPC boolean {other:?}"),
            };
            self.expect_close("boolean")?;
            Value::Bool(v)
        } else if self.try_open("string") {
            let text = self.read_text()?;
            self.expect_close("string")?;
            Value::Str(text)
        } else if self.try_open("array") {
            self.expect_open("data")?;
            let mut items = Vec::new();
            loop {
                self.skip_ws();
                if !self.rest().starts_with("<value>") {
                    break;
                }
                items.push(self.parse_value()?);
            }
            self.expect_close("data")?;
            self.expect_close("array")?;
            Value::Array(items)
        } else if self.try_open("struct") {
            let mut members = Vec::new();
            while self.try_open("member") {
                self.expect_open("name")?;
                let name = self.read_text()?;
                self.expect_close("name")?;
                let value = self.parse_value()?;
                self.expect_close("member")?;
                members.push((name, value));
            }
            self.expect_close("struct")?;
            Value::Struct(members)
        } else {
            // Untyped <value>text</value> is a string per XML-RPC.
            Value::Str(self.read_text()?)
        };
        self.expect_close("value")?;
        Ok(value)
    }

    fn parse_scalar<T: std::str::FromStr>(&mut self, tag: &str) -> Result<T> {
        let text = self.read_text()?;
        let parsed = text
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("bad XML-RPC <{tag}> value {text:?}"))?;
        self.expect_close(tag)?;
        Ok(parsed)
    }
}

fn unescape(raw: &str) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let end = match rest.find(';') {
            Some(e) => e,
            None => bail!("unterminated XML entity in {raw:?}"),
        };
        match &rest[..=end] {
            "&amp;" => out.push('&'),
            "&lt;" => out.push('<'),
            "&gt;" => out.push('>'),
            "&quot;" => out.push('"'),
            "&apos;" => out.push('\''),
            other => bail!("unsupported XML entity {other:?}"),
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
