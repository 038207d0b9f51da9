/*!
All serialization and construction routines for the OpenFlow message primitives

Use the trait `OfpPacket` for serialization implementations of messages
that are sent. Other primitives that are part of a message should
implement a serialize funtion that operates on a given byte stream.
*/

use action::{Action, ErAction, VPortAction, VendorAction};
use byteorder::{NetworkEndian, WriteBytesExt};
use flow::MatchKey;
use openflow::messages::*;
use std::io;
use std::io::Write;
use std::mem::size_of;

impl OfpHeader {
    /// Constructs an `OfpHeader`
    pub fn new(typ: OfpType, xid: u32) -> OfpHeader {
        OfpHeader {
            version: OFP_VERSION,
            typ: typ as u8,
            length: OfpHeader::header_length() as u16,
            xid: xid,
        }
    }

    /// Returns the fixed header length of 8 (in byte)
    pub fn header_length() -> usize {
        size_of::<OfpHeader>()
    }

    /// Serializes this header on the given stream
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_all(&[self.version, self.typ])?;
        stream.write_u16::<NetworkEndian>(self.length)?;
        stream.write_u32::<NetworkEndian>(self.xid)
    }
}

/// Writes `s` into a zero filled field of `len` bytes.
/// The last byte is always left zero to terminate the string.
fn write_str<S: Write>(stream: &mut S, s: &str, len: usize) -> io::Result<()> {
    let mut field = vec![0; len];
    let bytes = s.as_bytes();
    let n = bytes.len().min(len - 1);
    field[..n].copy_from_slice(&bytes[..n]);
    stream.write_all(&field)
}

impl MatchKey {
    /// Length of a match on the wire
    pub fn length() -> usize {
        48
    }

    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        let flow = &self.flow;
        stream.write_u32::<NetworkEndian>(self.wildcards)?;
        stream.write_u32::<NetworkEndian>(flow.in_port)?;
        stream.write_all(&flow.dl_src.0)?;
        stream.write_all(&flow.dl_dst.0)?;
        stream.write_u16::<NetworkEndian>(flow.dl_vlan)?;
        stream.write_u16::<NetworkEndian>(flow.dl_type)?;
        stream.write_u32::<NetworkEndian>(flow.nw_src)?;
        stream.write_u32::<NetworkEndian>(flow.nw_dst)?;
        stream.write_all(&[flow.nw_proto, 0, 0, 0])?;
        stream.write_u16::<NetworkEndian>(flow.tp_src)?;
        stream.write_u16::<NetworkEndian>(flow.tp_dst)?;
        stream.write_u32::<NetworkEndian>(flow.mpls_label1)?;
        stream.write_u32::<NetworkEndian>(flow.mpls_label2)
    }
}

fn write_action_header<S: Write>(stream: &mut S, typ: u16, len: usize) -> io::Result<()> {
    stream.write_u16::<NetworkEndian>(typ)?;
    stream.write_u16::<NetworkEndian>(len as u16)
}

impl Action {
    /// Length of this action on the wire
    pub fn length(&self) -> usize {
        match *self {
            Action::Output { .. } => OFP_ACTION_OUTPUT_LEN,
            Action::SetDlSrc(_) | Action::SetDlDst(_) => OFP_ACTION_DL_ADDR_LEN,
            Action::Vendor(_) => ER_ACTION_LEN,
            _ => OFP_ACTION_SHORT_LEN,
        }
    }

    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        let len = self.length();
        match *self {
            Action::Output { port, max_len } => {
                write_action_header(stream, OfpActionType::Output as u16, len)?;
                stream.write_u32::<NetworkEndian>(port)?;
                stream.write_u16::<NetworkEndian>(max_len)?;
                stream.write_all(&[0; 6])
            }
            Action::SetVlanVid(vid) => {
                write_action_header(stream, OfpActionType::SetVlanVid as u16, len)?;
                stream.write_u16::<NetworkEndian>(vid)?;
                stream.write_all(&[0; 2])
            }
            Action::SetVlanPcp(pcp) => {
                write_action_header(stream, OfpActionType::SetVlanPcp as u16, len)?;
                stream.write_all(&[pcp, 0, 0, 0])
            }
            Action::StripVlan => {
                write_action_header(stream, OfpActionType::StripVlan as u16, len)?;
                stream.write_all(&[0; 4])
            }
            Action::SetDlSrc(addr) | Action::SetDlDst(addr) => {
                let typ = match *self {
                    Action::SetDlSrc(_) => OfpActionType::SetDlSrc,
                    _ => OfpActionType::SetDlDst,
                };
                write_action_header(stream, typ as u16, len)?;
                stream.write_all(&addr.0)?;
                stream.write_all(&[0; 6])
            }
            Action::SetNwSrc(addr) => {
                write_action_header(stream, OfpActionType::SetNwSrc as u16, len)?;
                stream.write_u32::<NetworkEndian>(addr)
            }
            Action::SetNwDst(addr) => {
                write_action_header(stream, OfpActionType::SetNwDst as u16, len)?;
                stream.write_u32::<NetworkEndian>(addr)
            }
            Action::SetTpSrc(port) => {
                write_action_header(stream, OfpActionType::SetTpSrc as u16, len)?;
                stream.write_u16::<NetworkEndian>(port)?;
                stream.write_all(&[0; 2])
            }
            Action::SetTpDst(port) => {
                write_action_header(stream, OfpActionType::SetTpDst as u16, len)?;
                stream.write_u16::<NetworkEndian>(port)?;
                stream.write_all(&[0; 2])
            }
            Action::SetMplsLabel(label) => {
                write_action_header(stream, OfpActionType::SetMplsLabel as u16, len)?;
                stream.write_u32::<NetworkEndian>(label)
            }
            Action::SetMplsExp(exp) => {
                write_action_header(stream, OfpActionType::SetMplsExp as u16, len)?;
                stream.write_all(&[exp, 0, 0, 0])
            }
            Action::Vendor(VendorAction::Ericsson(ref er)) => {
                write_action_header(stream, OfpActionType::Vendor as u16, len)?;
                stream.write_u32::<NetworkEndian>(ER_VENDOR_ID)?;
                match *er {
                    ErAction::PushMpls { label, exp, ttl } => {
                        stream.write_u16::<NetworkEndian>(ErActionSubtype::PushMpls as u16)?;
                        stream.write_all(&[exp, ttl])?;
                        stream.write_u32::<NetworkEndian>(label)
                    }
                    ErAction::PopMpls { eth_type } => {
                        stream.write_u16::<NetworkEndian>(ErActionSubtype::PopMpls as u16)?;
                        stream.write_u16::<NetworkEndian>(eth_type)?;
                        stream.write_all(&[0; 4])
                    }
                }
            }
        }
    }
}

/// Serializes an action list
pub fn serialize_actions<S: Write>(actions: &[Action], stream: &mut S) -> io::Result<()> {
    for action in actions {
        action.serialize(stream)?;
    }
    Ok(())
}

/// Length of an action list on the wire
pub fn actions_length(actions: &[Action]) -> usize {
    actions.iter().map(Action::length).sum()
}

impl VPortAction {
    /// Length of this action on the wire
    pub fn length(&self) -> usize {
        match *self {
            VPortAction::Output { .. } => OFP_ACTION_OUTPUT_LEN,
            VPortAction::PushMpls { .. } => OFP_VPORT_ACTION_PUSH_MPLS_LEN,
            _ => OFP_ACTION_SHORT_LEN,
        }
    }

    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        let len = self.length();
        match *self {
            VPortAction::Output { port, max_len } => {
                write_action_header(stream, OfpVportActionType::Output as u16, len)?;
                stream.write_u32::<NetworkEndian>(port)?;
                stream.write_u16::<NetworkEndian>(max_len)?;
                stream.write_all(&[0; 6])
            }
            VPortAction::PopMpls { eth_type } => {
                write_action_header(stream, OfpVportActionType::PopMpls as u16, len)?;
                stream.write_u16::<NetworkEndian>(eth_type)?;
                stream.write_all(&[0; 2])
            }
            VPortAction::PushMpls { label, exp, ttl } => {
                write_action_header(stream, OfpVportActionType::PushMpls as u16, len)?;
                stream.write_u32::<NetworkEndian>(label)?;
                stream.write_all(&[exp, ttl, 0, 0, 0, 0, 0, 0])
            }
            VPortAction::SetMplsLabel(label) => {
                write_action_header(stream, OfpVportActionType::SetMplsLabel as u16, len)?;
                stream.write_u32::<NetworkEndian>(label)
            }
            VPortAction::SetMplsExp(exp) => {
                write_action_header(stream, OfpVportActionType::SetMplsExp as u16, len)?;
                stream.write_all(&[exp, 0, 0, 0])
            }
        }
    }
}

impl OfpPhyPort {
    /// Length of a port description on the wire
    pub fn length() -> usize {
        52
    }

    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u32::<NetworkEndian>(self.port_no)?;
        stream.write_all(&self.hw_addr.0)?;
        stream.write_all(&[0; 2])?;
        write_str(stream, &self.name, OFP_MAX_PORT_NAME_LEN)?;
        stream.write_u32::<NetworkEndian>(self.config)?;
        stream.write_u32::<NetworkEndian>(self.state)?;
        stream.write_u32::<NetworkEndian>(self.curr)?;
        stream.write_u32::<NetworkEndian>(self.advertised)?;
        stream.write_u32::<NetworkEndian>(self.supported)?;
        stream.write_u32::<NetworkEndian>(self.peer)
    }
}

impl OfpDescStats {
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        write_str(stream, &self.mfr_desc, DESC_STR_LEN)?;
        write_str(stream, &self.hw_desc, DESC_STR_LEN)?;
        write_str(stream, &self.sw_desc, DESC_STR_LEN)?;
        write_str(stream, &self.serial_num, SERIAL_NUM_LEN)
    }
}

impl OfpFlowStatsRequest {
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        self.match_key.serialize(stream)?;
        stream.write_all(&[self.table_id, 0, 0, 0])?;
        stream.write_u32::<NetworkEndian>(self.out_port)
    }
}

impl OfpFlowStats {
    /// Length of the fixed part of a flow statistics entry
    pub fn header_length() -> usize {
        88
    }

    /// Length of this entry on the wire
    pub fn length(&self) -> usize {
        OfpFlowStats::header_length() + actions_length(&self.actions)
    }

    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u16::<NetworkEndian>(self.length() as u16)?;
        stream.write_all(&[self.table_id, 0])?;
        self.match_key.serialize(stream)?;
        stream.write_u32::<NetworkEndian>(self.duration_sec)?;
        stream.write_u16::<NetworkEndian>(self.priority)?;
        stream.write_u16::<NetworkEndian>(self.idle_timeout)?;
        stream.write_u16::<NetworkEndian>(self.hard_timeout)?;
        stream.write_all(&[0; 2])?;
        stream.write_u64::<NetworkEndian>(self.cookie)?;
        stream.write_u64::<NetworkEndian>(self.packet_count)?;
        stream.write_u64::<NetworkEndian>(self.byte_count)?;
        serialize_actions(&self.actions, stream)
    }
}

impl OfpAggregateStats {
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u64::<NetworkEndian>(self.packet_count)?;
        stream.write_u64::<NetworkEndian>(self.byte_count)?;
        stream.write_u32::<NetworkEndian>(self.flow_count)?;
        stream.write_all(&[0; 4])
    }
}

impl OfpTableStats {
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_all(&[self.table_id, 0, 0, 0])?;
        write_str(stream, &self.name, OFP_MAX_TABLE_NAME_LEN)?;
        stream.write_u32::<NetworkEndian>(self.wildcards)?;
        stream.write_u32::<NetworkEndian>(self.max_entries)?;
        stream.write_u32::<NetworkEndian>(self.active_count)?;
        stream.write_u64::<NetworkEndian>(self.lookup_count)?;
        stream.write_u64::<NetworkEndian>(self.matched_count)
    }
}

impl OfpPortStats {
    /// Length of a port statistics entry on the wire
    pub fn length() -> usize {
        112
    }

    /// Statistics of a port that keeps none of the counters
    pub fn unknown(port_no: u32) -> OfpPortStats {
        OfpPortStats {
            port_no: port_no,
            rx_packets: u64::max_value(),
            tx_packets: u64::max_value(),
            rx_bytes: u64::max_value(),
            tx_bytes: u64::max_value(),
            rx_dropped: u64::max_value(),
            tx_dropped: u64::max_value(),
            rx_errors: u64::max_value(),
            tx_errors: u64::max_value(),
            rx_frame_err: u64::max_value(),
            rx_over_err: u64::max_value(),
            rx_crc_err: u64::max_value(),
            collisions: u64::max_value(),
            mpls_ttl0_dropped: u64::max_value(),
        }
    }

    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u32::<NetworkEndian>(self.port_no)?;
        stream.write_all(&[0; 4])?;
        for counter in &[
            self.rx_packets,
            self.tx_packets,
            self.rx_bytes,
            self.tx_bytes,
            self.rx_dropped,
            self.tx_dropped,
            self.rx_errors,
            self.tx_errors,
            self.rx_frame_err,
            self.rx_over_err,
            self.rx_crc_err,
            self.collisions,
            self.mpls_ttl0_dropped,
        ] {
            stream.write_u64::<NetworkEndian>(*counter)?;
        }
        Ok(())
    }
}

impl OfpVportTableStats {
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u32::<NetworkEndian>(self.max_vports)?;
        stream.write_u32::<NetworkEndian>(self.active_vports)?;
        stream.write_u64::<NetworkEndian>(self.lookup_count)?;
        stream.write_u64::<NetworkEndian>(self.port_match_count)?;
        stream.write_u64::<NetworkEndian>(self.chain_match_count)
    }
}

/// An OpenFlow packet. Must be implemented for all OpenFlow messsages that are sent.
pub trait OfpPacket {
    /// Constructs an OfpHeader with the given body length and transaction ID
    fn header(&self, body_length: usize, xid: u32) -> OfpHeader {
        OfpHeader {
            version: OFP_VERSION,
            typ: Self::typ() as u8,
            length: (OfpHeader::header_length() + body_length) as u16,
            xid: xid,
        }
    }

    /// Returns the packet's type
    fn typ() -> OfpType;

    /// Serializes this packet with network byte order.
    /// The xid is used as its header's transaction id.
    fn serialize<S: Write>(&self, stream: &mut S, xid: u32) -> io::Result<()> {
        let mut body = vec![];
        self.serialize_body(&mut body)?;
        if OfpHeader::header_length() + body.len() > usize::from(u16::max_value()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "OpenFlow message exceeds the maximum length",
            ));
        }
        let header = self.header(body.len(), xid);
        debug!("Outgoing message: {:?}", header);
        header.serialize(stream)?;
        stream.write_all(&body)
    }

    /// Serializes this packet's body.
    /// Implementers have to output network byte order on the given stream.
    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()>;
}

impl OfpEchoRequest {
    /// Constructs a new `OfpEchoRequest` with `arbitrary` content.
    pub fn new(arbitrary: Vec<u8>) -> OfpEchoRequest {
        OfpEchoRequest {
            arbitrary: arbitrary,
        }
    }
}
impl OfpPacket for OfpEchoRequest {
    fn typ() -> OfpType {
        OfpType::EchoRequest
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_all(&self.arbitrary)
    }
}

impl OfpEchoReply {
    /// Constructs a new `OfpEchoReply` with `arbitrary` content.
    /// This should be the same as in the `OfpEchoRequest` that issued this reply.
    pub fn new(arbitrary: Vec<u8>) -> OfpEchoReply {
        OfpEchoReply {
            arbitrary: arbitrary,
        }
    }
}
impl OfpPacket for OfpEchoReply {
    fn typ() -> OfpType {
        OfpType::EchoReply
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_all(&self.arbitrary)
    }
}

impl OfpPacket for OfpErrorMsg {
    fn typ() -> OfpType {
        OfpType::Error
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u16::<NetworkEndian>(self.typ)?;
        stream.write_u16::<NetworkEndian>(self.code)?;
        stream.write_all(&self.data)
    }
}

impl OfpPacket for OfpSwitchFeatures {
    fn typ() -> OfpType {
        OfpType::FeaturesReply
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u64::<NetworkEndian>(self.datapath_id)?;
        stream.write_u32::<NetworkEndian>(self.n_buffers)?;
        stream.write_all(&[self.n_tables, 0, 0, 0])?;
        stream.write_u32::<NetworkEndian>(self.capabilities)?;
        stream.write_u32::<NetworkEndian>(self.actions)?;
        for port in &self.ports {
            port.serialize(stream)?;
        }
        Ok(())
    }
}

impl OfpPacket for OfpGetConfigReply {
    fn typ() -> OfpType {
        OfpType::GetConfigReply
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u16::<NetworkEndian>(self.flags)?;
        stream.write_u16::<NetworkEndian>(self.miss_send_len)
    }
}

impl OfpPacket for OfpSetConfig {
    fn typ() -> OfpType {
        OfpType::SetConfig
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u16::<NetworkEndian>(self.flags)?;
        stream.write_u16::<NetworkEndian>(self.miss_send_len)
    }
}

impl OfpPacket for OfpPacketIn {
    fn typ() -> OfpType {
        OfpType::PacketIn
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u32::<NetworkEndian>(self.buffer_id)?;
        stream.write_u16::<NetworkEndian>(self.total_len)?;
        stream.write_all(&[self.reason, 0])?;
        stream.write_u32::<NetworkEndian>(self.in_port)?;
        stream.write_all(&self.data)
    }
}

impl OfpPacketOut {
    /// Constructs a Packet-Out for a packet held in the switch's buffer
    pub fn new_buffered(buffer_id: u32, in_port: u32, actions: Vec<Action>) -> OfpPacketOut {
        OfpPacketOut {
            buffer_id: buffer_id,
            in_port: in_port,
            actions: actions,
            data: vec![],
        }
    }
}

impl OfpPacket for OfpPacketOut {
    fn typ() -> OfpType {
        OfpType::PacketOut
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u32::<NetworkEndian>(self.buffer_id)?;
        stream.write_u32::<NetworkEndian>(self.in_port)?;
        stream.write_u16::<NetworkEndian>(actions_length(&self.actions) as u16)?;
        stream.write_all(&[0; 6])?;
        serialize_actions(&self.actions, stream)?;
        stream.write_all(&self.data)
    }
}

impl OfpFlowMod {
    /// Constructs an `OfpFlowMod` with the given fields.
    /// The flow is permanent and does not refer to a buffered packet.
    pub fn new(
        command: OfpFlowModCommand,
        match_key: MatchKey,
        priority: u16,
        actions: Vec<Action>,
    ) -> OfpFlowMod {
        OfpFlowMod {
            match_key: match_key,
            cookie: 0,
            command: command as u16,
            idle_timeout: OFP_FLOW_PERMANENT,
            hard_timeout: OFP_FLOW_PERMANENT,
            priority: priority,
            buffer_id: OFP_NO_BUFFER,
            out_port: OFPP_NONE,
            flags: 0,
            actions: actions,
        }
    }
}

impl OfpPacket for OfpFlowMod {
    fn typ() -> OfpType {
        OfpType::FlowMod
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        self.match_key.serialize(stream)?;
        stream.write_u64::<NetworkEndian>(self.cookie)?;
        stream.write_u16::<NetworkEndian>(self.command)?;
        stream.write_u16::<NetworkEndian>(self.idle_timeout)?;
        stream.write_u16::<NetworkEndian>(self.hard_timeout)?;
        stream.write_u16::<NetworkEndian>(self.priority)?;
        stream.write_u32::<NetworkEndian>(self.buffer_id)?;
        stream.write_u32::<NetworkEndian>(self.out_port)?;
        stream.write_u16::<NetworkEndian>(self.flags)?;
        stream.write_all(&[0; 6])?;
        serialize_actions(&self.actions, stream)
    }
}

impl OfpPacket for OfpFlowExpired {
    fn typ() -> OfpType {
        OfpType::FlowExpired
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        self.match_key.serialize(stream)?;
        stream.write_u16::<NetworkEndian>(self.priority)?;
        stream.write_all(&[self.reason, 0])?;
        stream.write_u32::<NetworkEndian>(self.duration)?;
        stream.write_u64::<NetworkEndian>(self.packet_count)?;
        stream.write_u64::<NetworkEndian>(self.byte_count)
    }
}

impl OfpPacket for OfpPortMod {
    fn typ() -> OfpType {
        OfpType::PortMod
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u32::<NetworkEndian>(self.port_no)?;
        stream.write_all(&self.hw_addr.0)?;
        stream.write_all(&[0; 2])?;
        stream.write_u32::<NetworkEndian>(self.config)?;
        stream.write_u32::<NetworkEndian>(self.mask)?;
        stream.write_u32::<NetworkEndian>(self.advertise)?;
        stream.write_all(&[0; 4])
    }
}

impl OfpPacket for OfpPortStatus {
    fn typ() -> OfpType {
        OfpType::PortStatus
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_all(&[self.reason, 0, 0, 0, 0, 0, 0, 0])?;
        self.desc.serialize(stream)
    }
}

impl OfpPacket for OfpStatsRequest {
    fn typ() -> OfpType {
        OfpType::StatsRequest
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u16::<NetworkEndian>(self.typ)?;
        stream.write_u16::<NetworkEndian>(self.flags)?;
        stream.write_all(&self.body)
    }
}

impl OfpPacket for OfpStatsReply {
    fn typ() -> OfpType {
        OfpType::StatsReply
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u16::<NetworkEndian>(self.typ)?;
        stream.write_u16::<NetworkEndian>(self.flags)?;
        stream.write_all(&self.body)
    }
}

impl OfpPacket for OfpVportMod {
    fn typ() -> OfpType {
        OfpType::VportMod
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u32::<NetworkEndian>(self.vport)?;
        stream.write_u32::<NetworkEndian>(self.parent_port)?;
        stream.write_u16::<NetworkEndian>(self.command)?;
        stream.write_all(&[0; 6])?;
        for action in &self.actions {
            action.serialize(stream)?;
        }
        Ok(())
    }
}

impl OfpPacket for OfpVportTableFeatures {
    fn typ() -> OfpType {
        OfpType::VportTableFeaturesReply
    }

    fn serialize_body<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u32::<NetworkEndian>(self.actions)?;
        stream.write_u32::<NetworkEndian>(self.max_vports)?;
        stream.write_u16::<NetworkEndian>(self.max_chain_depth)?;
        stream.write_all(&[self.mixed_chaining as u8, 0, 0, 0, 0, 0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow::FlowKey;
    use packet::MacAddr;

    #[test]
    fn echo_reply_header() {
        let xid = 42;
        let expected = OfpHeader {
            version: 1,
            typ: 3,
            length: 8,
            xid: xid,
        };
        let testee = OfpEchoReply { arbitrary: vec![] };
        assert_eq!(expected, testee.header(0, xid));
    }

    #[test]
    fn echo_reply_body_serialization() {
        let arbitrary = vec![1, 2, 3, 4];
        let testee = OfpEchoReply {
            arbitrary: arbitrary,
        };
        let mut ser = vec![];
        testee.serialize_body(&mut ser).unwrap();
        assert_eq!(vec![1, 2, 3, 4], ser);
        assert_eq!(12, testee.header(ser.len(), 1).length);
    }

    #[test]
    fn match_serialization() {
        let flow = FlowKey {
            in_port: 0x11223344,
            dl_dst: MacAddr([1, 2, 3, 4, 5, 6]),
            nw_proto: 17,
            tp_dst: 53,
            ..FlowKey::default()
        };
        let testee = MatchKey::exact(flow);
        let mut ser = vec![];
        testee.serialize(&mut ser).unwrap();
        assert_eq!(MatchKey::length(), ser.len());
        assert_eq!(&[0, 0, 0, 0, 0x11, 0x22, 0x33, 0x44], &ser[0..8]);
        assert_eq!(&[1, 2, 3, 4, 5, 6], &ser[14..20]);
        assert_eq!(&[17, 0, 0, 0], &ser[32..36]);
        assert_eq!(&[0, 53], &ser[38..40]);
    }

    #[test]
    fn action_output_serialization() {
        let testee = Action::Output {
            port: 0x11223344,
            max_len: 0x80,
        };
        let mut ser = vec![];
        testee.serialize(&mut ser).unwrap();
        assert_eq!(16, ser.len());
        assert_eq!(
            vec![0, 0, 0, 16, 0x11, 0x22, 0x33, 0x44, 0, 0x80, 0, 0, 0, 0, 0, 0],
            ser
        );
    }

    #[test]
    fn vendor_action_serialization() {
        let testee = Action::Vendor(VendorAction::Ericsson(ErAction::PushMpls {
            label: 0x12345,
            exp: 3,
            ttl: 9,
        }));
        let mut ser = vec![];
        testee.serialize(&mut ser).unwrap();
        assert_eq!(
            vec![0xff, 0xff, 0, 16, 0, 0, 0x13, 0x20, 0, 0, 3, 9, 0, 0x01, 0x23, 0x45],
            ser
        );
    }

    #[test]
    fn action_lengths_are_multiples_of_8() {
        let actions = vec![
            Action::StripVlan,
            Action::SetDlSrc(MacAddr::BROADCAST),
            Action::SetTpDst(80),
        ];
        let mut ser = vec![];
        serialize_actions(&actions, &mut ser).unwrap();
        assert_eq!(32, ser.len());
        assert_eq!(32, actions_length(&actions));
    }

    #[test]
    fn flow_mod_layout() {
        let mut testee = OfpFlowMod::new(
            OfpFlowModCommand::Add,
            MatchKey::all(),
            OFP_DEFAULT_PRIORITY,
            vec![Action::Output {
                port: 2,
                max_len: 0,
            }],
        );
        testee.idle_timeout = 5;
        let mut ser = vec![];
        testee.serialize(&mut ser, 7).unwrap();
        assert_eq!(8 + 80 + 16, ser.len());
        assert_eq!(&[1, 14, 0, 104, 0, 0, 0, 7], &ser[0..8]);
        // command, idle timeout
        assert_eq!(&[0, 0, 0, 5], &ser[64..68]);
        assert_eq!(&[0xff, 0xff, 0xff, 0xff], &ser[72..76]);
    }

    #[test]
    fn phy_port_name_is_terminated() {
        let testee = OfpPhyPort {
            port_no: 1,
            hw_addr: MacAddr::default(),
            name: "a-very-long-port-name".to_owned(),
            config: 0,
            state: OFPPS_LINK_DOWN,
            curr: 0,
            advertised: 0,
            supported: 0,
            peer: 0,
        };
        let mut ser = vec![];
        testee.serialize(&mut ser).unwrap();
        assert_eq!(OfpPhyPort::length(), ser.len());
        assert_eq!(b"a-very-long-por\0", &ser[12..28]);
        assert_eq!(&[0, 0, 0, 1], &ser[32..36]);
    }

    #[test]
    fn oversized_message_is_refused() {
        let testee = OfpEchoRequest::new(vec![0; 0xfff8]);
        let mut ser = vec![];
        assert!(testee.serialize(&mut ser, 1).is_err());
        assert!(ser.is_empty());
    }
}
