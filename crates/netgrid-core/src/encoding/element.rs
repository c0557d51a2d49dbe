//! Row codecs for persisted values.
//!
//! Top-level rows ([`NetNode`], [`NetLink`], [`NetworkInfo`]) start with a
//! format-version byte. Embedded fragments ([`Point`], [`Line`], [`BBox`])
//! are unversioned; their layout is owned by the enclosing row.
//!
//! # Formats
//!
//! - `Point`: 1 flag byte (bit 0 = has Z), X, Y, optional Z as big-endian
//!   IEEE-754 bits
//! - `Line`: 4-byte vertex count, then vertices
//! - `BBox`: min X, min Y, max X, max Y
//! - `NetNode`: version, 8-byte id, presence byte, optional `Point`
//! - `NetLink`: version, 8-byte id, start id, end id, presence byte,
//!   optional `Line`
//! - `NetworkInfo`: version, length-prefixed name, kind byte, 4-byte SRID,
//!   flag byte (bit 0 = has Z, bit 1 = allow coincident), both counters

use crate::error::CoreError;
use crate::geom::{BBox, Line, Point};
use crate::types::{LinkId, NetLink, NetNode, NetworkConfig, NetworkInfo, NetworkKind, NodeId};

use super::reader::ByteReader;
use super::traits::{Decoder, Encoder, FORMAT_VERSION};

const FLAG_HAS_Z: u8 = 0b0000_0001;
const FLAG_ALLOW_COINCIDENT: u8 = 0b0000_0010;

fn push_f64(buf: &mut Vec<u8>, value: f64) {
    buf.extend_from_slice(&value.to_bits().to_be_bytes());
}

fn push_string(buf: &mut Vec<u8>, value: &str) -> Result<(), CoreError> {
    let len = u32::try_from(value.len()).map_err(|_| CoreError::encoding("string too long"))?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(value.as_bytes());
    Ok(())
}

impl Encoder for Point {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(if self.has_z() { FLAG_HAS_Z } else { 0 });
        push_f64(buf, self.x);
        push_f64(buf, self.y);
        if let Some(z) = self.z {
            push_f64(buf, z);
        }
        Ok(())
    }
}

impl Point {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, CoreError> {
        let flags = r.take_u8()?;
        let x = r.take_f64()?;
        let y = r.take_f64()?;
        let z = if flags & FLAG_HAS_Z != 0 { Some(r.take_f64()?) } else { None };
        Ok(Self { x, y, z })
    }
}

impl Decoder for Point {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        Self::decode_from(&mut ByteReader::new(bytes))
    }
}

impl Encoder for Line {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        let count = u32::try_from(self.len())
            .map_err(|_| CoreError::encoding("too many vertices"))?;
        buf.extend_from_slice(&count.to_be_bytes());
        for p in self.points() {
            p.encode_to(buf)?;
        }
        Ok(())
    }
}

impl Line {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, CoreError> {
        let count = r.take_u32()? as usize;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(Point::decode_from(r)?);
        }
        Self::new(points)
    }
}

impl Decoder for Line {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        Self::decode_from(&mut ByteReader::new(bytes))
    }
}

impl Encoder for BBox {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        push_f64(buf, self.min_x);
        push_f64(buf, self.min_y);
        push_f64(buf, self.max_x);
        push_f64(buf, self.max_y);
        Ok(())
    }
}

impl Decoder for BBox {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut r = ByteReader::new(bytes);
        Ok(Self {
            min_x: r.take_f64()?,
            min_y: r.take_f64()?,
            max_x: r.take_f64()?,
            max_y: r.take_f64()?,
        })
    }
}

impl Encoder for NetNode {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&self.id.as_u64().to_be_bytes());
        match &self.geom {
            Some(p) => {
                buf.push(1);
                p.encode_to(buf)?;
            }
            None => buf.push(0),
        }
        Ok(())
    }
}

impl Decoder for NetNode {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut r = ByteReader::new(bytes);
        r.expect_version(FORMAT_VERSION)?;
        let id = NodeId::new(r.take_u64()?);
        let geom = match r.take_u8()? {
            0 => None,
            _ => Some(Point::decode_from(&mut r)?),
        };
        Ok(Self { id, geom })
    }
}

impl Encoder for NetLink {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&self.id.as_u64().to_be_bytes());
        buf.extend_from_slice(&self.start.as_u64().to_be_bytes());
        buf.extend_from_slice(&self.end.as_u64().to_be_bytes());
        match &self.geom {
            Some(l) => {
                buf.push(1);
                l.encode_to(buf)?;
            }
            None => buf.push(0),
        }
        Ok(())
    }
}

impl Decoder for NetLink {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut r = ByteReader::new(bytes);
        r.expect_version(FORMAT_VERSION)?;
        let id = LinkId::new(r.take_u64()?);
        let start = NodeId::new(r.take_u64()?);
        let end = NodeId::new(r.take_u64()?);
        let geom = match r.take_u8()? {
            0 => None,
            _ => Some(Line::decode_from(&mut r)?),
        };
        Ok(Self { id, start, end, geom })
    }
}

impl Encoder for NetworkInfo {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(FORMAT_VERSION);
        push_string(buf, &self.config.name)?;
        buf.push(match self.config.kind {
            NetworkKind::Logical => 0,
            NetworkKind::Spatial => 1,
        });
        buf.extend_from_slice(&self.config.srid.to_be_bytes());
        let mut flags = 0u8;
        if self.config.has_z {
            flags |= FLAG_HAS_Z;
        }
        if self.config.allow_coincident {
            flags |= FLAG_ALLOW_COINCIDENT;
        }
        buf.push(flags);
        buf.extend_from_slice(&self.next_node_id.to_be_bytes());
        buf.extend_from_slice(&self.next_link_id.to_be_bytes());
        Ok(())
    }
}

impl Decoder for NetworkInfo {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut r = ByteReader::new(bytes);
        r.expect_version(FORMAT_VERSION)?;
        let name = r.take_string()?;
        let kind = match r.take_u8()? {
            0 => NetworkKind::Logical,
            1 => NetworkKind::Spatial,
            other => {
                return Err(CoreError::encoding(format!("unknown network kind: {other}")));
            }
        };
        let srid = r.take_i32()?;
        let flags = r.take_u8()?;
        let config = NetworkConfig {
            name,
            kind,
            srid,
            has_z: flags & FLAG_HAS_Z != 0,
            allow_coincident: flags & FLAG_ALLOW_COINCIDENT != 0,
        };
        let next_node_id = r.take_u64()?;
        let next_link_id = r.take_u64()?;
        Ok(Self { config, next_node_id, next_link_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_row_round_trip() {
        let node = NetNode::new(NodeId::new(12), Some(Point::new_z(1.0, -2.0, 0.5)));
        let decoded = NetNode::decode(&node.encode().expect("encode")).expect("decode");
        assert_eq!(decoded, node);

        let bare = NetNode::new(NodeId::new(13), None);
        assert_eq!(NetNode::decode(&bare.encode().expect("encode")).expect("decode"), bare);
    }

    #[test]
    fn link_row_round_trip() {
        let line = Line::new(vec![Point::new(0.0, 0.0), Point::new(3.5, 4.5)]).expect("line");
        let link = NetLink::new(LinkId::new(9), NodeId::new(1), NodeId::new(2), Some(line));
        let decoded = NetLink::decode(&link.encode().expect("encode")).expect("decode");
        assert_eq!(decoded, link);
    }

    #[test]
    fn registry_row_round_trip() {
        let mut info = NetworkInfo::new(NetworkConfig::new(
            "roads",
            NetworkKind::Spatial,
            4326,
            true,
            false,
        ));
        info.next_node_id = 17;
        info.next_link_id = 5;
        let decoded = NetworkInfo::decode(&info.encode().expect("encode")).expect("decode");
        assert_eq!(decoded, info);
    }

    #[test]
    fn corrupt_version_is_rejected() {
        let node = NetNode::new(NodeId::new(1), None);
        let mut bytes = node.encode().expect("encode");
        bytes[0] = 99;
        assert!(NetNode::decode(&bytes).is_err());
    }
}
