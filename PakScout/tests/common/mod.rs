//! Synthetic LSPK archive builder for integration tests

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use lz4_flex::frame::FrameEncoder;

/// How a member's bytes are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Raw,
    /// LZ4 block without a size prefix
    Block,
    /// Self-describing LZ4 frame
    Frame,
}

/// How the file table is compressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCompression {
    Block,
    Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// v13+ header at the end of the file
    Trailing,
    /// v10 header at the start, members after the 280-byte prologue
    Leading,
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub payload: Vec<u8>,
    pub storage: Storage,
    pub offset_override: Option<u64>,
}

impl Member {
    pub fn new(name: &str, payload: &[u8], storage: Storage) -> Self {
        Self {
            name: name.to_string(),
            payload: payload.to_vec(),
            storage,
            offset_override: None,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset_override = Some(offset);
        self
    }

    fn stored_bytes(&self) -> Vec<u8> {
        match self.storage {
            Storage::Raw => self.payload.clone(),
            Storage::Block => lz4_flex::block::compress(&self.payload),
            Storage::Frame => frame_compress(&self.payload),
        }
    }

    /// Uncompressed size as written to the table. Frame members record their
    /// stored size so that only the frame magic gives them away.
    fn recorded_uncompressed_size(&self, stored_len: usize) -> u64 {
        match self.storage {
            Storage::Block => self.payload.len() as u64,
            Storage::Raw | Storage::Frame => stored_len as u64,
        }
    }
}

struct Record {
    name: String,
    offset: u64,
    size_on_disk: u64,
    uncompressed_size: u64,
}

/// Builds a complete archive in memory
#[derive(Debug, Clone)]
pub struct PakBuilder {
    version: u32,
    placement: Placement,
    table_compression: TableCompression,
    stride: Option<usize>,
    members: Vec<Member>,
}

impl PakBuilder {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            placement: if version >= 13 {
                Placement::Trailing
            } else {
                Placement::Leading
            },
            table_compression: TableCompression::Block,
            stride: None,
            members: Vec::new(),
        }
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn table_compression(mut self, compression: TableCompression) -> Self {
        self.table_compression = compression;
        self
    }

    /// Write table records this many bytes wide instead of the version default
    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn raw(self, name: &str, payload: &[u8]) -> Self {
        self.member(Member::new(name, payload, Storage::Raw))
    }

    pub fn compressed(self, name: &str, payload: &[u8]) -> Self {
        self.member(Member::new(name, payload, Storage::Block))
    }

    pub fn framed(self, name: &str, payload: &[u8]) -> Self {
        self.member(Member::new(name, payload, Storage::Frame))
    }

    fn default_stride(&self) -> usize {
        if self.version >= 13 { 296 } else { 272 }
    }

    pub fn build(&self) -> Vec<u8> {
        match self.placement {
            Placement::Trailing => self.build_trailing(),
            Placement::Leading => self.build_leading(),
        }
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }

    fn build_trailing(&self) -> Vec<u8> {
        // Member offsets must be non-zero, so the data region starts after a small pad
        let mut data = vec![0u8; 4];
        let records = self.write_members(&mut data, 0);

        let directory_offset = data.len() as u64;
        let (count, compressed) = self.table(&records);
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        data.extend_from_slice(&compressed);

        let mut body = Vec::new();
        body.extend_from_slice(&self.version.to_le_bytes());
        body.extend_from_slice(&directory_offset.to_le_bytes());
        body.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        body.extend_from_slice(&[0u8; 4]);
        body.extend_from_slice(&count.to_le_bytes());
        body.extend_from_slice(&[0u8; 4]);

        data.extend_from_slice(&body);
        data.extend_from_slice(&(body.len() as u32 + 8).to_le_bytes());
        data.extend_from_slice(b"LSPK");
        data
    }

    fn build_leading(&self) -> Vec<u8> {
        const BASE: usize = 280;

        let mut data = vec![0u8; BASE + 4];
        let records = self.write_members(&mut data, BASE as u64);

        let directory_offset = data.len() as u64;
        let (count, compressed) = self.table(&records);
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        data.extend_from_slice(&compressed);

        let mut header = Vec::with_capacity(32);
        header.extend_from_slice(b"LSPK");
        header.extend_from_slice(&self.version.to_le_bytes());
        header.extend_from_slice(&directory_offset.to_le_bytes());
        header.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        header.extend_from_slice(&[0u8; 8]);
        header.extend_from_slice(&count.to_le_bytes());
        header.resize(32, 0);
        data[..32].copy_from_slice(&header);
        data
    }

    fn write_members(&self, data: &mut Vec<u8>, base: u64) -> Vec<Record> {
        self.members
            .iter()
            .map(|member| {
                let stored = member.stored_bytes();
                let offset = data.len() as u64 - base;
                data.extend_from_slice(&stored);
                Record {
                    name: member.name.clone(),
                    offset: member.offset_override.unwrap_or(offset),
                    size_on_disk: stored.len() as u64,
                    uncompressed_size: member.recorded_uncompressed_size(stored.len()),
                }
            })
            .collect()
    }

    fn table(&self, records: &[Record]) -> (u32, Vec<u8>) {
        let stride = self.stride.unwrap_or_else(|| self.default_stride());
        let mut table = Vec::with_capacity(records.len() * stride);

        for record in records {
            let mut raw = vec![0u8; stride];
            raw[..record.name.len()].copy_from_slice(record.name.as_bytes());
            if self.version >= 18 {
                raw[256..260].copy_from_slice(&(record.offset as u32).to_le_bytes());
                raw[264..268].copy_from_slice(&(record.size_on_disk as u32).to_le_bytes());
                raw[268..272].copy_from_slice(&(record.uncompressed_size as u32).to_le_bytes());
            } else if self.version >= 13 {
                raw[256..264].copy_from_slice(&record.offset.to_le_bytes());
                raw[264..272].copy_from_slice(&record.size_on_disk.to_le_bytes());
                raw[272..280].copy_from_slice(&record.uncompressed_size.to_le_bytes());
            } else {
                raw[256..264].copy_from_slice(&record.offset.to_le_bytes());
                raw[264..268].copy_from_slice(&(record.size_on_disk as u32).to_le_bytes());
                raw[268..272].copy_from_slice(&(record.uncompressed_size as u32).to_le_bytes());
            }
            table.extend_from_slice(&raw);
        }

        let compressed = match self.table_compression {
            TableCompression::Block => lz4_flex::block::compress(&table),
            TableCompression::Frame => frame_compress(&table),
        };
        (records.len() as u32, compressed)
    }
}

pub fn frame_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = FrameEncoder::new(Vec::new());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A metadata document long enough to compress well
pub fn meta_lsx(mod_name: &str) -> Vec<u8> {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<save>\n",
            "  <version major=\"4\" minor=\"0\" revision=\"9\" build=\"331\"/>\n",
            "  <region id=\"Config\">\n",
            "    <node id=\"root\">\n",
            "      <children>\n",
            "        <node id=\"ModuleInfo\">\n",
            "          <attribute id=\"Name\" type=\"LSString\" value=\"{name}\"/>\n",
            "          <attribute id=\"Folder\" type=\"LSString\" value=\"{name}\"/>\n",
            "        </node>\n",
            "      </children>\n",
            "    </node>\n",
            "  </region>\n",
            "</save>\n"
        ),
        name = mod_name
    )
    .into_bytes()
}

/// Printable bytes that are never mistaken for compressed data
pub fn printable(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'A' + (i % 26) as u8).collect()
}
