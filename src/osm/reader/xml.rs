// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::io;
use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use super::model::{self, MAX_WAY_NODES};
use super::FeatureReader;
use crate::osm::Error;
use crate::{Direction, Node};

/// LineSource is a trait for objects which hand out consecutive lines of the input.
///
/// This trait only exists to avoid copying in-memory data
/// through an [io::BufRead] implementation.
pub(super) trait LineSource {
    fn next_line(&mut self) -> io::Result<Option<&[u8]>>;
}

/// IoLines implements [LineSource] over an [std::io::BufRead].
pub(super) struct IoLines<R: io::BufRead>(R, Vec<u8>);

impl<R: io::BufRead> LineSource for IoLines<R> {
    #[inline]
    fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.1.clear();
        if self.0.read_until(b'\n', &mut self.1)? == 0 {
            Ok(None)
        } else {
            Ok(Some(&self.1))
        }
    }
}

/// BufLines implements [LineSource] over a slice of bytes (`&[u8]`).
pub(super) struct BufLines<'a>(&'a [u8]);

impl<'a> LineSource for BufLines<'a> {
    #[inline]
    fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        if self.0.is_empty() {
            return Ok(None);
        }

        let (line, rest) = match self.0.iter().position(|&b| b == b'\n') {
            Some(end) => (&self.0[..end], &self.0[end + 1..]),
            None => (self.0, &self.0[self.0.len()..]),
        };
        self.0 = rest;
        Ok(Some(line))
    }
}

/// Interprets the elements of consecutive lines.
///
/// Starts outside of a way; a `<way>` opening tag enters a way, and `</way>`
/// leaves it, emitting the collected [model::Way]. Nodes are emitted as soon
/// as they are encountered, regardless of the state.
#[derive(Debug, Default)]
struct LineParser {
    line: usize,
    strict: bool,
    way: Option<model::Way>,
    pending: VecDeque<model::Feature>,
}

impl LineParser {
    fn feed(&mut self, line: &[u8]) -> Result<(), Error> {
        self.line += 1;

        let mut r = quick_xml::Reader::from_reader(line);
        let config = r.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        loop {
            match r.read_event() {
                Ok(Event::Empty(start)) => {
                    self.element(&start)?;
                    if start.local_name().as_ref() == b"way" {
                        self.close_way();
                    }
                }

                Ok(Event::Start(start)) => self.element(&start)?,

                Ok(Event::End(end)) => {
                    if end.local_name().as_ref() == b"way" {
                        self.close_way();
                    }
                }

                Ok(Event::Eof) => return Ok(()),

                Ok(_) => {}

                // The rest of the line is lost, but the next line starts afresh
                Err(e) => return self.malformed(format!("invalid XML: {e}")),
            }
        }
    }

    fn element(&mut self, start: &BytesStart<'_>) -> Result<(), Error> {
        match start.local_name().as_ref() {
            b"node" => match parse_node(start) {
                Some(n) => self.pending.push_back(model::Feature::Node(n)),
                None => return self.malformed("invalid node"),
            },

            b"way" => {
                self.way = Some(model::Way::default());
            }

            b"nd" => {
                if let Some(ref mut w) = self.way {
                    match parse_nd(start) {
                        Some(ref_) if w.nodes.len() < MAX_WAY_NODES => w.nodes.push(ref_),
                        Some(ref_) => log::debug!(
                            "line {}: dropping reference to {ref_} past {MAX_WAY_NODES} way nodes",
                            self.line
                        ),
                        None => return self.malformed("invalid node reference"),
                    }
                }
            }

            b"tag" => {
                if let Some(ref mut w) = self.way {
                    match parse_tag(start) {
                        Some((k, v)) if k == "oneway" => w.direction = oneway_direction(&v),
                        Some(_) => {}
                        None => return self.malformed("invalid tag"),
                    }
                }
            }

            _ => {}
        }

        Ok(())
    }

    fn close_way(&mut self) {
        if let Some(w) = self.way.take() {
            self.pending.push_back(model::Feature::Way(w));
        }
    }

    fn malformed<S: Into<String>>(&self, reason: S) -> Result<(), Error> {
        let reason = reason.into();
        if self.strict {
            Err(Error::Malformed {
                line: self.line,
                reason,
            })
        } else {
            log::debug!("line {}: {reason} - skipping", self.line);
            Ok(())
        }
    }

    fn finish(&mut self) {
        if self.way.take().is_some() {
            log::debug!("unterminated way at the end of input - discarding");
        }
    }
}

/// Reader reads map [Features](model::Feature) from a line-oriented XML file.
pub(super) struct Reader<L: LineSource> {
    lines: L,
    parser: LineParser,
}

impl<L: LineSource> Reader<L> {
    #[inline]
    fn new(lines: L, strict: bool) -> Self {
        Self {
            lines,
            parser: LineParser {
                strict,
                ..Default::default()
            },
        }
    }
}

impl<L: LineSource> FeatureReader for Reader<L> {
    type Error = Error;

    fn next(&mut self) -> Result<Option<model::Feature>, Self::Error> {
        loop {
            if let Some(f) = self.parser.pending.pop_front() {
                return Ok(Some(f));
            }

            match self.lines.next_line()? {
                Some(line) => self.parser.feed(line)?,
                None => {
                    self.parser.finish();
                    return Ok(None);
                }
            }
        }
    }
}

impl<'a> Reader<BufLines<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8], strict: bool) -> Self {
        Self::new(BufLines(data), strict)
    }
}

impl<R: io::BufRead> Reader<IoLines<R>> {
    #[inline]
    pub(super) fn from_io(reader: R, strict: bool) -> Self {
        Self::new(IoLines(reader, Vec::default()), strict)
    }
}

/// Interprets the value of a `oneway` tag.
pub(super) fn oneway_direction(value: &str) -> Direction {
    match value {
        "yes" | "true" | "1" => Direction::Forward,
        "-1" | "reverse" => Direction::Reverse,
        _ => Direction::Bidirectional,
    }
}

fn parse_node(start: &BytesStart<'_>) -> Option<Node> {
    let mut id: Option<i64> = None;
    let mut lat = f64::NAN;
    let mut lon = f64::NAN;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"id" => id = Some(from_utf8(&attr.value).ok()?.trim().parse().ok()?),
            b"lat" => lat = from_utf8(&attr.value).ok()?.trim().parse().ok()?,
            b"lon" => lon = from_utf8(&attr.value).ok()?.trim().parse().ok()?,
            _ => {}
        }
    }

    match id {
        Some(id) if lat.is_finite() && lon.is_finite() => Some(Node { id, lat, lon }),
        _ => None,
    }
}

fn parse_tag(start: &BytesStart<'_>) -> Option<(String, String)> {
    let mut k = None;
    let mut v = None;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"k" => k = from_utf8(&attr.value).ok().map(|s| s.to_string()),
            b"v" => v = from_utf8(&attr.value).ok().map(|s| s.to_string()),
            _ => {}
        }
    }

    k.map(|k| (k, v.unwrap_or_default()))
}

fn parse_nd(start: &BytesStart<'_>) -> Option<i64> {
    let mut ref_ = None;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == b"ref" {
            ref_ = Some(from_utf8(&attr.value).ok()?.trim().parse().ok()?);
        }
    }

    ref_
}
