// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Chunked machine-code image with container/raw output helpers.

use std::io::{self, Read, Write};

use serde_json::json;

/// Padding byte for gaps and RMB reservations: the 6809 NOP opcode.
pub const FILL_BYTE: u8 = 0x12;

/// A contiguous run of assembled bytes starting at `base`.
#[derive(Debug, Clone)]
pub struct Chunk {
    base: u16,
    bytes: Vec<u8>,
}

impl Chunk {
    pub fn new(base: u16) -> Self {
        Self {
            base,
            bytes: Vec::new(),
        }
    }

    pub fn base(&self) -> u16 {
        self.base
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// First address past the chunk's last byte.
    pub fn end(&self) -> u16 {
        self.base.wrapping_add(self.bytes.len() as u16)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Sparse byte-addressable image: an ordered set of chunks, one of which is
/// active for writes. ORG directives open new chunks for non-contiguous
/// regions; chunks never merge.
#[derive(Debug)]
pub struct ImageStore {
    chunks: Vec<Chunk>,
    active: usize,
}

impl ImageStore {
    pub fn new(start: u16) -> Self {
        Self {
            chunks: vec![Chunk::new(start)],
            active: 0,
        }
    }

    /// Build a single-chunk image from raw bytes (raw binary input).
    pub fn from_bytes(base: u16, data: &[u8]) -> Self {
        Self {
            chunks: vec![Chunk {
                base,
                bytes: data.to_vec(),
            }],
            active: 0,
        }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn num_bytes(&self) -> usize {
        self.chunks.iter().map(|c| c.bytes.len()).sum()
    }

    /// Reactivate the first chunk at the start of a pass.
    pub fn rewind(&mut self) {
        self.active = 0;
    }

    /// Point the store at `addr` for an ORG directive. An existing chunk
    /// based there is reactivated (pass 2 revisits pass-1 chunks); an
    /// address contiguous with the active chunk keeps it; an empty active
    /// chunk is rebased; anything else opens a new chunk.
    pub fn org(&mut self, addr: u16) {
        if let Some(ix) = self.chunks.iter().position(|c| c.base == addr) {
            self.active = ix;
            return;
        }
        if self.chunks[self.active].end() == addr && !self.chunks[self.active].is_empty() {
            return;
        }
        if self.chunks[self.active].is_empty() {
            self.chunks[self.active].base = addr;
            return;
        }
        self.chunks.push(Chunk::new(addr));
        self.active = self.chunks.len() - 1;
    }

    /// Write a byte into the active chunk: append at the end, overwrite in
    /// place, or pad with `FILL_BYTE` up to a forward address.
    pub fn poke(&mut self, addr: u16, value: u8) {
        let chunk = &mut self.chunks[self.active];
        let Some(offset) = addr.checked_sub(chunk.base) else {
            // ORG handling keeps writes at or above the active base; an
            // address below it means the driver lost track of its chunk.
            panic!("poke at {addr:04X} below active chunk base {:04X}", chunk.base);
        };
        let offset = offset as usize;
        if offset < chunk.bytes.len() {
            chunk.bytes[offset] = value;
            return;
        }
        while chunk.bytes.len() < offset {
            chunk.bytes.push(FILL_BYTE);
        }
        chunk.bytes.push(value);
    }

    /// Exact base-address chunk lookup. ORG must already have created the
    /// chunk; a miss is a driver bug and aborts the process.
    pub fn chunk_for_address(&self, addr: u16) -> &Chunk {
        match self.chunks.iter().find(|c| c.base == addr) {
            Some(chunk) => chunk,
            None => panic!("no chunk starts at {addr:04X}"),
        }
    }

    /// Chunked-hex container: one record per non-empty chunk, in creation
    /// order, each `{ "address": <base>, "code": "<uppercase hex pairs>" }`.
    pub fn to_json(&self) -> serde_json::Value {
        let records: Vec<serde_json::Value> = self
            .chunks
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| {
                let code: String = c.bytes.iter().map(|b| format!("{b:02X}")).collect();
                json!({ "address": c.base, "code": code })
            })
            .collect();
        json!(records)
    }

    pub fn write_image<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_all(self.to_json().to_string().as_bytes())
    }

    /// Parse a chunked-hex container.
    pub fn read_image<R: Read>(mut input: R) -> io::Result<Self> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &serde_json::Value) -> io::Result<Self> {
        let invalid = |msg: &str| io::Error::new(io::ErrorKind::InvalidData, msg.to_string());

        let records = value.as_array().ok_or_else(|| invalid("expected a record array"))?;
        let mut chunks = Vec::with_capacity(records.len());
        for record in records {
            let address = record
                .get("address")
                .and_then(|v| v.as_u64())
                .and_then(|v| u16::try_from(v).ok())
                .ok_or_else(|| invalid("record address must be a 16-bit integer"))?;
            let code = record
                .get("code")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid("record code must be a string"))?;
            if code.len() % 2 != 0 {
                return Err(invalid("record code has an odd hex-digit count"));
            }
            let mut bytes = Vec::with_capacity(code.len() / 2);
            for pair in code.as_bytes().chunks(2) {
                let pair = std::str::from_utf8(pair)
                    .map_err(|_| invalid("record code is not valid hex"))?;
                let byte = u8::from_str_radix(pair, 16)
                    .map_err(|_| invalid("record code is not valid hex"))?;
                bytes.push(byte);
            }
            chunks.push(Chunk {
                base: address,
                bytes,
            });
        }
        if chunks.is_empty() {
            return Err(invalid("container holds no chunks"));
        }
        Ok(Self { chunks, active: 0 })
    }

    /// Raw binary dump: chunk bytes concatenated in order, no metadata.
    pub fn write_bin<W: Write>(&self, mut out: W) -> io::Result<()> {
        for chunk in &self.chunks {
            out.write_all(&chunk.bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageStore, FILL_BYTE};

    #[test]
    fn poke_appends_overwrites_and_pads() {
        let mut image = ImageStore::new(0x1000);
        image.poke(0x1000, 0xAA);
        image.poke(0x1001, 0xBB);
        image.poke(0x1000, 0xCC); // overwrite in place
        image.poke(0x1004, 0xDD); // two-byte gap padded
        let chunk = &image.chunks()[0];
        assert_eq!(chunk.bytes(), &[0xCC, 0xBB, FILL_BYTE, FILL_BYTE, 0xDD]);
        assert_eq!(chunk.end(), 0x1005);
    }

    #[test]
    fn org_opens_rebases_and_reactivates_chunks() {
        let mut image = ImageStore::new(0x0000);
        // Empty initial chunk is rebased, not abandoned.
        image.org(0x1000);
        image.poke(0x1000, 0x01);
        assert_eq!(image.chunks().len(), 1);

        // Contiguous ORG keeps the active chunk.
        image.org(0x1001);
        image.poke(0x1001, 0x02);
        assert_eq!(image.chunks().len(), 1);

        // A gap opens a new chunk.
        image.org(0x2000);
        image.poke(0x2000, 0x03);
        assert_eq!(image.chunks().len(), 2);

        // Revisiting a known base reactivates its chunk (pass 2).
        image.org(0x1000);
        image.poke(0x1000, 0xFF);
        assert_eq!(image.chunks().len(), 2);
        assert_eq!(image.chunks()[0].bytes()[0], 0xFF);
    }

    #[test]
    fn chunk_for_address_finds_exact_bases() {
        let mut image = ImageStore::new(0x1000);
        image.poke(0x1000, 0x01);
        image.org(0x2000);
        image.poke(0x2000, 0x02);
        assert_eq!(image.chunk_for_address(0x2000).bytes(), &[0x02]);
    }

    #[test]
    #[should_panic(expected = "no chunk starts at")]
    fn chunk_for_address_panics_on_unknown_base() {
        let image = ImageStore::new(0x1000);
        let _ = image.chunk_for_address(0x3000);
    }

    #[test]
    fn container_round_trips_chunks_in_order() {
        let mut image = ImageStore::new(0x1000);
        for (ix, byte) in [0x86, 0x05, 0xB7, 0x20, 0x00, 0x39].iter().enumerate() {
            image.poke(0x1000 + ix as u16, *byte);
        }
        image.org(0x4000);
        image.poke(0x4000, 0x12);

        let value = image.to_json();
        assert_eq!(value[0]["address"], 0x1000);
        assert_eq!(value[0]["code"], "8605B7200039");
        assert_eq!(value[1]["address"], 0x4000);

        let parsed = ImageStore::from_json(&value).expect("container parses");
        assert_eq!(parsed.chunks().len(), 2);
        assert_eq!(parsed.chunks()[0].base(), 0x1000);
        assert_eq!(parsed.chunks()[0].bytes(), image.chunks()[0].bytes());
    }

    #[test]
    fn container_rejects_malformed_records() {
        let odd = serde_json::json!([{ "address": 0, "code": "123" }]);
        assert!(ImageStore::from_json(&odd).is_err());
        let nonhex = serde_json::json!([{ "address": 0, "code": "ZZ" }]);
        assert!(ImageStore::from_json(&nonhex).is_err());
        let wide = serde_json::json!([{ "address": 0x10000, "code": "00" }]);
        assert!(ImageStore::from_json(&wide).is_err());
        assert!(ImageStore::from_json(&serde_json::json!({})).is_err());
    }

    #[test]
    fn raw_dump_concatenates_chunks() {
        let mut image = ImageStore::new(0x1000);
        image.poke(0x1000, 0x01);
        image.org(0x2000);
        image.poke(0x2000, 0x02);
        let mut out = Vec::new();
        image.write_bin(&mut out).expect("write bin");
        assert_eq!(out, vec![0x01, 0x02]);
    }
}
