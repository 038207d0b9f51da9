/*!
All deserialization routines for the OpenFlow message primitives

The header uses a special deserialization because its size is known.
Use the trait `Deserialize` for any other deserialization implementation.
*/

use action::{Action, ErAction, VPortAction, VendorAction};
use byteorder::{ByteOrder, NetworkEndian};
use flow::{FlowKey, MatchKey};
use openflow::error::{Error, Result};
use openflow::messages::*;
use packet::MacAddr;

impl OfpHeader {
    /// Deserializes an OpenFlow header
    pub fn deserialize(bytes: &[u8; 8]) -> OfpHeader {
        OfpHeader {
            version: bytes[0],
            typ: bytes[1],
            length: NetworkEndian::read_u16(&bytes[2..4]),
            xid: NetworkEndian::read_u32(&bytes[4..]),
        }
    }

    /// Deserializes the header at the start of a message.
    /// Fails if the message is too short to hold one.
    pub fn from_message(msg: &[u8]) -> Result<OfpHeader> {
        if msg.len() < OfpHeader::header_length() {
            return Err(Error::BadRequest(OfpBadRequestCode::BadLen));
        }
        let mut bytes = [0; 8];
        bytes.copy_from_slice(&msg[..8]);
        Ok(OfpHeader::deserialize(&bytes))
    }

    /// Returns the body length in byte
    pub fn body_length(&self) -> usize {
        (self.length as usize).saturating_sub(OfpHeader::header_length())
    }
}

/// To be implemented by all OpenFlow message parts that are received.
pub trait Deserialize {
    /// The type to deserialize
    type R;

    /// Deserialize the bytes buffer
    /// Fails on providing a too small or too large buffer
    fn deserialize(bytes: &[u8]) -> Result<Self::R> {
        if Self::min_length() > bytes.len() || Self::max_length() < bytes.len() {
            return Err(Error::BadRequest(OfpBadRequestCode::BadLen));
        }
        Self::deserialize_len_ok(bytes)
    }

    /// Deserializes the byte buffer (network byte order)
    /// Implementers can rely on the bytes buffer's size to be greater or equal Self::min_length()
    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R>;

    /// The minimum length of the message part in bytes
    fn min_length() -> usize;

    /// The maximum length of the message part in bytes
    /// May not return a value greater than 0xFFF7
    /// If Self::R is fixed size, you probably have to
    /// override this implementation.
    fn max_length() -> usize {
        0xffff - OfpHeader::header_length()
    }
}

/// Reads a null-terminated string from a fixed size field
fn read_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl Deserialize for MatchKey {
    type R = MatchKey;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        let flow = FlowKey {
            in_port: NetworkEndian::read_u32(&bytes[4..8]),
            dl_src: MacAddr::from_slice(&bytes[8..14]),
            dl_dst: MacAddr::from_slice(&bytes[14..20]),
            dl_vlan: NetworkEndian::read_u16(&bytes[20..22]),
            dl_type: NetworkEndian::read_u16(&bytes[22..24]),
            nw_src: NetworkEndian::read_u32(&bytes[24..28]),
            nw_dst: NetworkEndian::read_u32(&bytes[28..32]),
            nw_proto: bytes[32],
            tp_src: NetworkEndian::read_u16(&bytes[36..38]),
            tp_dst: NetworkEndian::read_u16(&bytes[38..40]),
            mpls_label1: NetworkEndian::read_u32(&bytes[40..44]),
            mpls_label2: NetworkEndian::read_u32(&bytes[44..48]),
        };
        Ok(MatchKey::new(NetworkEndian::read_u32(&bytes[0..4]), flow))
    }

    fn min_length() -> usize {
        MatchKey::length()
    }

    fn max_length() -> usize {
        MatchKey::length()
    }
}

fn deserialize_er_action(bytes: &[u8]) -> ::std::result::Result<ErAction, OfpBadActionCode> {
    if bytes.len() != ER_ACTION_LEN {
        return Err(OfpBadActionCode::BadLen);
    }
    let subtype = NetworkEndian::read_u16(&bytes[8..10]);
    if subtype == ErActionSubtype::PushMpls as u16 {
        Ok(ErAction::PushMpls {
            exp: bytes[10],
            ttl: bytes[11],
            label: NetworkEndian::read_u32(&bytes[12..16]),
        })
    }
    else if subtype == ErActionSubtype::PopMpls as u16 {
        Ok(ErAction::PopMpls {
            eth_type: NetworkEndian::read_u16(&bytes[10..12]),
        })
    }
    else {
        Err(OfpBadActionCode::BadVendorType)
    }
}

fn deserialize_action(bytes: &[u8]) -> ::std::result::Result<Action, OfpBadActionCode> {
    let typ = NetworkEndian::read_u16(&bytes[0..2]);
    let typ = OfpActionType::from_u16(typ).ok_or(OfpBadActionCode::BadType)?;
    let expected = match typ {
        OfpActionType::Output => OFP_ACTION_OUTPUT_LEN,
        OfpActionType::SetDlSrc | OfpActionType::SetDlDst => OFP_ACTION_DL_ADDR_LEN,
        OfpActionType::Vendor => bytes.len(),
        _ => OFP_ACTION_SHORT_LEN,
    };
    if bytes.len() != expected {
        return Err(OfpBadActionCode::BadLen);
    }
    Ok(match typ {
        OfpActionType::Output => Action::Output {
            port: NetworkEndian::read_u32(&bytes[4..8]),
            max_len: NetworkEndian::read_u16(&bytes[8..10]),
        },
        OfpActionType::SetVlanVid => Action::SetVlanVid(NetworkEndian::read_u16(&bytes[4..6])),
        OfpActionType::SetVlanPcp => Action::SetVlanPcp(bytes[4]),
        OfpActionType::StripVlan => Action::StripVlan,
        OfpActionType::SetDlSrc => Action::SetDlSrc(MacAddr::from_slice(&bytes[4..10])),
        OfpActionType::SetDlDst => Action::SetDlDst(MacAddr::from_slice(&bytes[4..10])),
        OfpActionType::SetNwSrc => Action::SetNwSrc(NetworkEndian::read_u32(&bytes[4..8])),
        OfpActionType::SetNwDst => Action::SetNwDst(NetworkEndian::read_u32(&bytes[4..8])),
        OfpActionType::SetTpSrc => Action::SetTpSrc(NetworkEndian::read_u16(&bytes[4..6])),
        OfpActionType::SetTpDst => Action::SetTpDst(NetworkEndian::read_u16(&bytes[4..6])),
        OfpActionType::SetMplsLabel => {
            Action::SetMplsLabel(NetworkEndian::read_u32(&bytes[4..8]))
        }
        OfpActionType::SetMplsExp => Action::SetMplsExp(bytes[4]),
        OfpActionType::Vendor => match NetworkEndian::read_u32(&bytes[4..8]) {
            ER_VENDOR_ID => Action::Vendor(VendorAction::Ericsson(deserialize_er_action(bytes)?)),
            NX_VENDOR_ID => return Err(OfpBadActionCode::BadVendorType),
            _ => return Err(OfpBadActionCode::BadVendor),
        },
    })
}

/// Splits an action list into the single actions and checks their lengths.
/// Every action is at least 8 bytes long and a multiple of 8.
fn split_actions(bytes: &[u8]) -> ::std::result::Result<Vec<&[u8]>, OfpBadActionCode> {
    let mut actions = vec![];
    let mut rest = bytes;
    while !rest.is_empty() {
        if rest.len() < OFP_ACTION_HEADER_LEN {
            return Err(OfpBadActionCode::BadLen);
        }
        let len = NetworkEndian::read_u16(&rest[2..4]) as usize;
        if len < OFP_ACTION_SHORT_LEN || len % 8 != 0 || len > rest.len() {
            return Err(OfpBadActionCode::BadLen);
        }
        let (action, tail) = rest.split_at(len);
        actions.push(action);
        rest = tail;
    }
    Ok(actions)
}

/// Deserializes a list of flow actions
pub fn deserialize_actions(bytes: &[u8]) -> ::std::result::Result<Vec<Action>, OfpBadActionCode> {
    split_actions(bytes)?
        .into_iter()
        .map(deserialize_action)
        .collect()
}

fn deserialize_vport_action(bytes: &[u8]) -> ::std::result::Result<VPortAction, OfpBadActionCode> {
    let typ = NetworkEndian::read_u16(&bytes[0..2]);
    let typ = OfpVportActionType::from_u16(typ).ok_or(OfpBadActionCode::BadType)?;
    let expected = match typ {
        OfpVportActionType::Output => OFP_ACTION_OUTPUT_LEN,
        OfpVportActionType::PushMpls => OFP_VPORT_ACTION_PUSH_MPLS_LEN,
        _ => OFP_ACTION_SHORT_LEN,
    };
    if bytes.len() != expected {
        return Err(OfpBadActionCode::BadLen);
    }
    Ok(match typ {
        OfpVportActionType::Output => VPortAction::Output {
            port: NetworkEndian::read_u32(&bytes[4..8]),
            max_len: NetworkEndian::read_u16(&bytes[8..10]),
        },
        OfpVportActionType::PopMpls => VPortAction::PopMpls {
            eth_type: NetworkEndian::read_u16(&bytes[4..6]),
        },
        OfpVportActionType::PushMpls => VPortAction::PushMpls {
            label: NetworkEndian::read_u32(&bytes[4..8]),
            exp: bytes[8],
            ttl: bytes[9],
        },
        OfpVportActionType::SetMplsLabel => {
            VPortAction::SetMplsLabel(NetworkEndian::read_u32(&bytes[4..8]))
        }
        OfpVportActionType::SetMplsExp => VPortAction::SetMplsExp(bytes[4]),
    })
}

/// Deserializes a list of virtual port actions
pub fn deserialize_vport_actions(
    bytes: &[u8],
) -> ::std::result::Result<Vec<VPortAction>, OfpBadActionCode> {
    split_actions(bytes)?
        .into_iter()
        .map(deserialize_vport_action)
        .collect()
}

impl Deserialize for OfpEchoRequest {
    type R = OfpEchoRequest;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpEchoRequest {
            arbitrary: bytes.to_vec(),
        })
    }

    fn min_length() -> usize {
        0
    }
}

impl Deserialize for OfpEchoReply {
    type R = OfpEchoReply;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpEchoReply {
            arbitrary: bytes.to_vec(),
        })
    }

    fn min_length() -> usize {
        0
    }
}

impl Deserialize for OfpPhyPort {
    type R = OfpPhyPort;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpPhyPort {
            port_no: NetworkEndian::read_u32(&bytes[0..4]),
            hw_addr: MacAddr::from_slice(&bytes[4..10]),
            name: read_str(&bytes[12..28]),
            config: NetworkEndian::read_u32(&bytes[28..32]),
            state: NetworkEndian::read_u32(&bytes[32..36]),
            curr: NetworkEndian::read_u32(&bytes[36..40]),
            advertised: NetworkEndian::read_u32(&bytes[40..44]),
            supported: NetworkEndian::read_u32(&bytes[44..48]),
            peer: NetworkEndian::read_u32(&bytes[48..52]),
        })
    }

    fn min_length() -> usize {
        OfpPhyPort::length()
    }

    fn max_length() -> usize {
        OfpPhyPort::length()
    }
}

impl Deserialize for OfpSwitchFeatures {
    type R = OfpSwitchFeatures;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        let ports = &bytes[24..];
        if ports.len() % OfpPhyPort::length() != 0 {
            return Err(Error::BadRequest(OfpBadRequestCode::BadLen));
        }
        Ok(OfpSwitchFeatures {
            datapath_id: NetworkEndian::read_u64(&bytes[0..8]),
            n_buffers: NetworkEndian::read_u32(&bytes[8..12]),
            n_tables: bytes[12],
            capabilities: NetworkEndian::read_u32(&bytes[16..20]),
            actions: NetworkEndian::read_u32(&bytes[20..24]),
            ports: ports
                .chunks(OfpPhyPort::length())
                .map(OfpPhyPort::deserialize)
                .collect::<Result<_>>()?,
        })
    }

    fn min_length() -> usize {
        24
    }
}

impl Deserialize for OfpGetConfigReply {
    type R = OfpGetConfigReply;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpGetConfigReply {
            flags: NetworkEndian::read_u16(&bytes[0..2]),
            miss_send_len: NetworkEndian::read_u16(&bytes[2..4]),
        })
    }

    fn min_length() -> usize {
        4
    }

    fn max_length() -> usize {
        4
    }
}

impl Deserialize for OfpSetConfig {
    type R = OfpSetConfig;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpSetConfig {
            flags: NetworkEndian::read_u16(&bytes[0..2]),
            miss_send_len: NetworkEndian::read_u16(&bytes[2..4]),
        })
    }

    fn min_length() -> usize {
        4
    }

    fn max_length() -> usize {
        4
    }
}

impl Deserialize for OfpPacketIn {
    type R = OfpPacketIn;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpPacketIn {
            buffer_id: NetworkEndian::read_u32(&bytes[0..4]),
            total_len: NetworkEndian::read_u16(&bytes[4..6]),
            reason: bytes[6],
            in_port: NetworkEndian::read_u32(&bytes[8..12]),
            data: bytes[12..].to_vec(),
        })
    }

    fn min_length() -> usize {
        12
    }
}

impl Deserialize for OfpPacketOut {
    type R = OfpPacketOut;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        let actions_len = NetworkEndian::read_u16(&bytes[8..10]) as usize;
        if 16 + actions_len > bytes.len() {
            return Err(Error::BadRequest(OfpBadRequestCode::BadLen));
        }
        Ok(OfpPacketOut {
            buffer_id: NetworkEndian::read_u32(&bytes[0..4]),
            in_port: NetworkEndian::read_u32(&bytes[4..8]),
            actions: deserialize_actions(&bytes[16..16 + actions_len])?,
            data: bytes[16 + actions_len..].to_vec(),
        })
    }

    fn min_length() -> usize {
        16
    }
}

/// Position of `buffer_id` in a Flow-Mod body
pub const FLOW_MOD_BUFFER_ID_OFFSET: usize = 64;

/// Reads the buffer id of a Flow-Mod body that may not decode as a whole
pub fn flow_mod_buffer_id(bytes: &[u8]) -> Option<u32> {
    bytes
        .get(FLOW_MOD_BUFFER_ID_OFFSET..FLOW_MOD_BUFFER_ID_OFFSET + 4)
        .map(NetworkEndian::read_u32)
}

impl Deserialize for OfpFlowMod {
    type R = OfpFlowMod;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpFlowMod {
            match_key: MatchKey::deserialize(&bytes[0..48])?,
            cookie: NetworkEndian::read_u64(&bytes[48..56]),
            command: NetworkEndian::read_u16(&bytes[56..58]),
            idle_timeout: NetworkEndian::read_u16(&bytes[58..60]),
            hard_timeout: NetworkEndian::read_u16(&bytes[60..62]),
            priority: NetworkEndian::read_u16(&bytes[62..64]),
            buffer_id: NetworkEndian::read_u32(&bytes[FLOW_MOD_BUFFER_ID_OFFSET..FLOW_MOD_BUFFER_ID_OFFSET + 4]),
            out_port: NetworkEndian::read_u32(&bytes[68..72]),
            flags: NetworkEndian::read_u16(&bytes[72..74]),
            actions: deserialize_actions(&bytes[80..])?,
        })
    }

    fn min_length() -> usize {
        80
    }
}

impl Deserialize for OfpFlowExpired {
    type R = OfpFlowExpired;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpFlowExpired {
            match_key: MatchKey::deserialize(&bytes[0..48])?,
            priority: NetworkEndian::read_u16(&bytes[48..50]),
            reason: bytes[50],
            duration: NetworkEndian::read_u32(&bytes[52..56]),
            packet_count: NetworkEndian::read_u64(&bytes[56..64]),
            byte_count: NetworkEndian::read_u64(&bytes[64..72]),
        })
    }

    fn min_length() -> usize {
        72
    }

    fn max_length() -> usize {
        72
    }
}

impl Deserialize for OfpPortMod {
    type R = OfpPortMod;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpPortMod {
            port_no: NetworkEndian::read_u32(&bytes[0..4]),
            hw_addr: MacAddr::from_slice(&bytes[4..10]),
            config: NetworkEndian::read_u32(&bytes[12..16]),
            mask: NetworkEndian::read_u32(&bytes[16..20]),
            advertise: NetworkEndian::read_u32(&bytes[20..24]),
        })
    }

    fn min_length() -> usize {
        28
    }

    fn max_length() -> usize {
        28
    }
}

impl Deserialize for OfpPortStatus {
    type R = OfpPortStatus;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpPortStatus {
            reason: bytes[0],
            desc: OfpPhyPort::deserialize(&bytes[8..])?,
        })
    }

    fn min_length() -> usize {
        8 + OfpPhyPort::length()
    }

    fn max_length() -> usize {
        8 + OfpPhyPort::length()
    }
}

impl Deserialize for OfpStatsRequest {
    type R = OfpStatsRequest;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpStatsRequest {
            typ: NetworkEndian::read_u16(&bytes[0..2]),
            flags: NetworkEndian::read_u16(&bytes[2..4]),
            body: bytes[4..].to_vec(),
        })
    }

    fn min_length() -> usize {
        4
    }
}

impl Deserialize for OfpStatsReply {
    type R = OfpStatsReply;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpStatsReply {
            typ: NetworkEndian::read_u16(&bytes[0..2]),
            flags: NetworkEndian::read_u16(&bytes[2..4]),
            body: bytes[4..].to_vec(),
        })
    }

    fn min_length() -> usize {
        4
    }
}

impl Deserialize for OfpDescStats {
    type R = OfpDescStats;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpDescStats {
            mfr_desc: read_str(&bytes[0..256]),
            hw_desc: read_str(&bytes[256..512]),
            sw_desc: read_str(&bytes[512..768]),
            serial_num: read_str(&bytes[768..800]),
        })
    }

    fn min_length() -> usize {
        3 * DESC_STR_LEN + SERIAL_NUM_LEN
    }

    fn max_length() -> usize {
        3 * DESC_STR_LEN + SERIAL_NUM_LEN
    }
}

impl Deserialize for OfpFlowStatsRequest {
    type R = OfpFlowStatsRequest;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpFlowStatsRequest {
            match_key: MatchKey::deserialize(&bytes[0..48])?,
            table_id: bytes[48],
            out_port: NetworkEndian::read_u32(&bytes[52..56]),
        })
    }

    fn min_length() -> usize {
        56
    }

    fn max_length() -> usize {
        56
    }
}

impl Deserialize for OfpFlowStats {
    type R = OfpFlowStats;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpFlowStats {
            table_id: bytes[2],
            match_key: MatchKey::deserialize(&bytes[4..52])?,
            duration_sec: NetworkEndian::read_u32(&bytes[52..56]),
            priority: NetworkEndian::read_u16(&bytes[56..58]),
            idle_timeout: NetworkEndian::read_u16(&bytes[58..60]),
            hard_timeout: NetworkEndian::read_u16(&bytes[60..62]),
            cookie: NetworkEndian::read_u64(&bytes[64..72]),
            packet_count: NetworkEndian::read_u64(&bytes[72..80]),
            byte_count: NetworkEndian::read_u64(&bytes[80..88]),
            actions: deserialize_actions(&bytes[88..])?,
        })
    }

    fn min_length() -> usize {
        OfpFlowStats::header_length()
    }
}

/// Deserializes the body of a flow statistics reply into its entries
pub fn deserialize_flow_stats(body: &[u8]) -> Result<Vec<OfpFlowStats>> {
    let mut entries = vec![];
    let mut rest = body;
    while !rest.is_empty() {
        if rest.len() < 2 {
            return Err(Error::BadRequest(OfpBadRequestCode::BadLen));
        }
        let len = NetworkEndian::read_u16(&rest[0..2]) as usize;
        if len > rest.len() {
            return Err(Error::BadRequest(OfpBadRequestCode::BadLen));
        }
        let (entry, tail) = rest.split_at(len);
        entries.push(OfpFlowStats::deserialize(entry)?);
        rest = tail;
    }
    Ok(entries)
}

impl Deserialize for OfpAggregateStats {
    type R = OfpAggregateStats;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpAggregateStats {
            packet_count: NetworkEndian::read_u64(&bytes[0..8]),
            byte_count: NetworkEndian::read_u64(&bytes[8..16]),
            flow_count: NetworkEndian::read_u32(&bytes[16..20]),
        })
    }

    fn min_length() -> usize {
        24
    }

    fn max_length() -> usize {
        24
    }
}

impl Deserialize for OfpTableStats {
    type R = OfpTableStats;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpTableStats {
            table_id: bytes[0],
            name: read_str(&bytes[4..36]),
            wildcards: NetworkEndian::read_u32(&bytes[36..40]),
            max_entries: NetworkEndian::read_u32(&bytes[40..44]),
            active_count: NetworkEndian::read_u32(&bytes[44..48]),
            lookup_count: NetworkEndian::read_u64(&bytes[48..56]),
            matched_count: NetworkEndian::read_u64(&bytes[56..64]),
        })
    }

    fn min_length() -> usize {
        64
    }

    fn max_length() -> usize {
        64
    }
}

impl Deserialize for OfpPortStats {
    type R = OfpPortStats;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        let counter = |i: usize| NetworkEndian::read_u64(&bytes[8 + 8 * i..16 + 8 * i]);
        Ok(OfpPortStats {
            port_no: NetworkEndian::read_u32(&bytes[0..4]),
            rx_packets: counter(0),
            tx_packets: counter(1),
            rx_bytes: counter(2),
            tx_bytes: counter(3),
            rx_dropped: counter(4),
            tx_dropped: counter(5),
            rx_errors: counter(6),
            tx_errors: counter(7),
            rx_frame_err: counter(8),
            rx_over_err: counter(9),
            rx_crc_err: counter(10),
            collisions: counter(11),
            mpls_ttl0_dropped: counter(12),
        })
    }

    fn min_length() -> usize {
        OfpPortStats::length()
    }

    fn max_length() -> usize {
        OfpPortStats::length()
    }
}

impl Deserialize for OfpVportTableStats {
    type R = OfpVportTableStats;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpVportTableStats {
            max_vports: NetworkEndian::read_u32(&bytes[0..4]),
            active_vports: NetworkEndian::read_u32(&bytes[4..8]),
            lookup_count: NetworkEndian::read_u64(&bytes[8..16]),
            port_match_count: NetworkEndian::read_u64(&bytes[16..24]),
            chain_match_count: NetworkEndian::read_u64(&bytes[24..32]),
        })
    }

    fn min_length() -> usize {
        32
    }

    fn max_length() -> usize {
        32
    }
}

impl Deserialize for OfpVportMod {
    type R = OfpVportMod;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpVportMod {
            vport: NetworkEndian::read_u32(&bytes[0..4]),
            parent_port: NetworkEndian::read_u32(&bytes[4..8]),
            command: NetworkEndian::read_u16(&bytes[8..10]),
            actions: deserialize_vport_actions(&bytes[16..])?,
        })
    }

    fn min_length() -> usize {
        16
    }
}

impl Deserialize for OfpVportTableFeatures {
    type R = OfpVportTableFeatures;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        Ok(OfpVportTableFeatures {
            actions: NetworkEndian::read_u32(&bytes[0..4]),
            max_vports: NetworkEndian::read_u32(&bytes[4..8]),
            max_chain_depth: NetworkEndian::read_u16(&bytes[8..10]),
            mixed_chaining: bytes[10] != 0,
        })
    }

    fn min_length() -> usize {
        16
    }

    fn max_length() -> usize {
        16
    }
}

impl Deserialize for OfpErrorMsg {
    type R = OfpErrorMsg;

    fn deserialize_len_ok(bytes: &[u8]) -> Result<Self::R> {
        let typ = NetworkEndian::read_u16(&bytes[0..2]);
        let code = NetworkEndian::read_u16(&bytes[2..4]);
        Ok(OfpErrorMsg {
            typ: typ,
            code: code,
            data: bytes[4..].to_vec(),
        })
    }

    fn min_length() -> usize {
        4
    }
}
