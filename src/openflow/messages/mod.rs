/*!
The OpenFlow message primitives spoken between the switch datapath and its controller

This is based on the openflow.h from OpenFlow Switch Specification 1.0.0
with the Ericsson MPLS actions and the virtual port table extension.
All port numbers are widened to 32 bits.
The type names are changed to align with the Rust conventions.
*/

pub mod deserialize;
pub mod serialize;

use action::{Action, VPortAction};
use flow::MatchKey;
use packet::MacAddr;

use std::fmt;

impl OfpErrorMsg {
    fn first_64_bytes(request: &[u8]) -> Vec<u8> {
        if request.len() < 64 {
            request.to_vec()
        }
        else {
            request[0..64].to_vec()
        }
    }

    /// Constructs an error of the given type and code
    /// that carries the first 64 bytes of the failed request
    pub fn new(typ: OfpErrorType, code: u16, request: &[u8]) -> OfpErrorMsg {
        OfpErrorMsg {
            typ: typ as u16,
            code: code,
            data: Self::first_64_bytes(request),
        }
    }

    /// Constructs a Bad Request error
    pub fn new_bad_request(code: OfpBadRequestCode, request: &[u8]) -> OfpErrorMsg {
        Self::new(OfpErrorType::BadRequest, code as u16, request)
    }

    /// Constructs a Bad Action error
    pub fn new_bad_action(code: OfpBadActionCode, request: &[u8]) -> OfpErrorMsg {
        Self::new(OfpErrorType::BadAction, code as u16, request)
    }
}

impl fmt::Display for OfpErrorMsg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match OfpErrorType::from_u16(self.typ) {
            Some(typ) => write!(f, "OpenFlow Error: {:?}, code({})", typ, self.code),
            None => write!(f, "OpenFlow Error: type({}), code({})", self.typ, self.code),
        }
    }
}

/// Header on all OpenFlow packets.
#[derive(Debug, Clone, PartialEq)]
pub struct OfpHeader {
    /// OFP_VERSION.
    pub version: u8,
    /// This packet's OfpType.
    pub typ: u8,
    /// This packet's length including this OfpHeader.
    pub length: u16,
    /// Transaction id associated with this packet.
    /// Replies use the same id as was in the request
    /// to facilitate pairing.
    pub xid: u32,
}

/// An OpenFlow Echo Request
#[derive(Debug, PartialEq)]
pub struct OfpEchoRequest {
    pub arbitrary: Vec<u8>,
}

/// An OpenFlow Echo Reply
#[derive(Debug, PartialEq)]
pub struct OfpEchoReply {
    pub arbitrary: Vec<u8>,
}

/// Description of a physical port.
#[derive(Debug, Clone, PartialEq)]
pub struct OfpPhyPort {
    pub port_no: u32,
    pub hw_addr: MacAddr,
    /// Null-terminated on the wire, at most 15 characters.
    pub name: String,
    /// Bitmap of OFPPC_* flags.
    pub config: u32,
    /// Bitmap of OFPPS_* flags.
    pub state: u32,

    /* Bitmaps of OFPPF_* that describe features. All bits zeroed if
     * unsupported or unavailable. */
    /// Current features.
    pub curr: u32,
    /// Features being advertised by the port.
    pub advertised: u32,
    /// Features supported by the port.
    pub supported: u32,
    /// Features advertised by peer.
    pub peer: u32,
}

/// Switch features.
#[derive(Debug, PartialEq)]
pub struct OfpSwitchFeatures {
    /// Datapath unique ID. The lower 48-bits are for
    /// a MAC address, while the upper 16-bits are
    /// implementer-defined.
    pub datapath_id: u64,
    /// Max packets buffered at once.
    pub n_buffers: u32,
    /// Number of tables supported by datapath.
    pub n_tables: u8,

    /* Features. */
    /// Bitmap of support OFPC_* capabilities.
    pub capabilities: u32,
    /// Bitmap of supported `OfpActionType`s.
    pub actions: u32,

    /// Port definitions. The number of ports is inferred from the
    /// length field in the header.
    pub ports: Vec<OfpPhyPort>,
}

/// Switch configuration as reported by a Get Config Reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfpGetConfigReply {
    /// OFPC_* flags.
    pub flags: u16,
    /// Max bytes of new flow that datapath should
    /// send to the controller.
    pub miss_send_len: u16,
}

/// Switch configuration as requested by a Set Config message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfpSetConfig {
    /// OFPC_* flags.
    pub flags: u16,
    /// Max bytes of new flow that datapath should
    /// send to the controller.
    pub miss_send_len: u16,
}

/// Packet received on port (datapath -> controller).
#[derive(Debug, PartialEq)]
pub struct OfpPacketIn {
    /// ID assigned by datapath.
    pub buffer_id: u32,
    /// Full length of frame.
    pub total_len: u16,
    /// Reason packet is being sent (one of `OfpPacketInReason`).
    pub reason: u8,
    /// Port on which frame was received.
    pub in_port: u32,
    /// Ethernet frame, truncated to the configured maximum
    pub data: Vec<u8>,
}

/// Send packet (controller -> datapath).
#[derive(Debug, PartialEq)]
pub struct OfpPacketOut {
    /// ID assigned by datapath (OFP_NO_BUFFER if none).
    pub buffer_id: u32,
    /// Packet's input port (OFPP_NONE if none).
    pub in_port: u32,
    /// Actions.
    pub actions: Vec<Action>,
    /// Packet data. Only meaningful if buffer_id == OFP_NO_BUFFER.
    pub data: Vec<u8>,
}

/// Flow setup and teardown (controller -> datapath).
#[derive(Debug, Clone, PartialEq)]
pub struct OfpFlowMod {
    /// Fields to match.
    pub match_key: MatchKey,
    /// Opaque controller-issued identifier.
    pub cookie: u64,
    /// One of `OfpFlowModCommand`.
    pub command: u16,
    /// Idle time before discarding (seconds).
    pub idle_timeout: u16,
    /// Max time before discarding (seconds).
    pub hard_timeout: u16,
    /// Priority level of flow entry.
    pub priority: u16,
    /// Buffered packet to apply to, or OFP_NO_BUFFER.
    /// Not meaningful for OfpFlowModCommand::Delete*.
    pub buffer_id: u32,
    /// For OfpFlowModCommand::Delete* commands, require
    /// matching entries to include this as an
    /// output port. A value of OFPP_NONE
    /// indicates no restriction.
    pub out_port: u32,
    /// Bitmap of OFPFF_* flags.
    pub flags: u16,
    /// The action length is inferred from the length field in the header.
    pub actions: Vec<Action>,
}

/// Flow expiration (datapath -> controller).
#[derive(Debug, PartialEq)]
pub struct OfpFlowExpired {
    /// Description of fields.
    pub match_key: MatchKey,
    /// Priority level of flow entry.
    pub priority: u16,
    /// One of `OfpFlowExpiredReason`.
    pub reason: u8,
    /// Time flow was alive in seconds.
    pub duration: u32,
    pub packet_count: u64,
    pub byte_count: u64,
}

/// Modify behavior of the physical port.
#[derive(Debug, PartialEq)]
pub struct OfpPortMod {
    pub port_no: u32,
    /// The hardware address is not configurable. This is used to
    /// sanity-check the request, so it must be the same as returned in an
    /// `OfpPhyPort` struct.
    pub hw_addr: MacAddr,
    /// Bitmap of OFPPC_* flags.
    pub config: u32,
    /// Bitmap of OFPPC_* flags to be changed.
    pub mask: u32,
    /// Bitmap of OFPPF_*. Zero all bits to prevent any action taking place.
    pub advertise: u32,
}

/// A physical port has changed in the datapath.
#[derive(Debug, PartialEq)]
pub struct OfpPortStatus {
    /// One of `OfpPortReason`.
    pub reason: u8,
    pub desc: OfpPhyPort,
}

/// Statistics request (controller -> datapath).
#[derive(Debug, PartialEq)]
pub struct OfpStatsRequest {
    /// One of the `OfpStatsType` constants.
    pub typ: u16,
    /// OFPSF_REQ_* flags (none yet defined).
    pub flags: u16,
    /// Body of the request.
    pub body: Vec<u8>,
}

/// Statistics reply (datapath -> controller).
#[derive(Debug, PartialEq)]
pub struct OfpStatsReply {
    /// One of the `OfpStatsType` constants.
    pub typ: u16,
    /// OFPSF_REPLY_* flags.
    pub flags: u16,
    /// Body of the reply.
    pub body: Vec<u8>,
}

/// Body of reply to `OfpStatsType::Desc` request.
/// Each entry is a null-terminated ASCII string on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct OfpDescStats {
    /// Manufacturer description.
    pub mfr_desc: String,
    /// Hardware description.
    pub hw_desc: String,
    /// Software description.
    pub sw_desc: String,
    /// Serial number.
    pub serial_num: String,
}

/// Body for request of type `OfpStatsType::Flow` and `OfpStatsType::Aggregate`.
#[derive(Debug, Clone, PartialEq)]
pub struct OfpFlowStatsRequest {
    /// Fields to match.
    pub match_key: MatchKey,
    /// ID of table to read (from `OfpTableStats`)
    /// or OFPTT_ALL for all tables.
    pub table_id: u8,
    /// Require matching entries to include this
    /// as an output port. A value of OFPP_NONE
    /// indicates no restriction.
    pub out_port: u32,
}

/// Body of reply to `OfpStatsType::Flow` request.
#[derive(Debug, Clone, PartialEq)]
pub struct OfpFlowStats {
    /// ID of table flow came from.
    pub table_id: u8,
    /// Description of fields.
    pub match_key: MatchKey,
    /// Time flow has been alive in seconds.
    pub duration_sec: u32,
    /// Priority of the entry. Only meaningful
    /// when this is not an exact-match entry.
    pub priority: u16,
    /// Number of seconds idle before expiration.
    pub idle_timeout: u16,
    /// Number of seconds before expiration.
    pub hard_timeout: u16,
    /// Opaque controller-issued identifier.
    pub cookie: u64,
    /// Number of packets in flow.
    pub packet_count: u64,
    /// Number of bytes in flow.
    pub byte_count: u64,
    pub actions: Vec<Action>,
}

/// Body of reply to `OfpStatsType::Aggregate` request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OfpAggregateStats {
    /// Number of packets in flows.
    pub packet_count: u64,
    /// Number of bytes in flows.
    pub byte_count: u64,
    /// Number of flows.
    pub flow_count: u32,
}

/// Body of reply to `OfpStatsType::Table` request.
#[derive(Debug, Clone, PartialEq)]
pub struct OfpTableStats {
    /// Identifier of table. Lower numbered tables
    /// are consulted first.
    pub table_id: u8,
    pub name: String,
    /// Bitmap of OFPFW_* wildcards that are
    /// supported by the table.
    pub wildcards: u32,
    /// Max number of entries supported.
    pub max_entries: u32,
    /// Number of active entries.
    pub active_count: u32,
    /// Number of packets looked up in table.
    pub lookup_count: u64,
    /// Number of packets that hit table.
    pub matched_count: u64,
}

/// Body of reply to `OfpStatsType::Port` request.
/// If a counter is unsupported, set the field to all ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfpPortStats {
    pub port_no: u32,
    /// Number of received packets.
    pub rx_packets: u64,
    /// Number of transmitted packets.
    pub tx_packets: u64,
    /// Number of received bytes.
    pub rx_bytes: u64,
    /// Number of transmitted bytes.
    pub tx_bytes: u64,
    /// Number of packets dropped by RX.
    pub rx_dropped: u64,
    /// Number of packets dropped by TX.
    pub tx_dropped: u64,
    /// Number of receive errors. This is a super-set
    /// of receive errors and should be great than or
    /// equal to the sum of all rx_*_err values.
    pub rx_errors: u64,
    /// Number of transmit errors. This is a super-set
    /// of transmit errors.
    pub tx_errors: u64,
    /// Number of frame alignment errors.
    pub rx_frame_err: u64,
    /// Number of packets with RX overrun.
    pub rx_over_err: u64,
    /// Number of CRC errors.
    pub rx_crc_err: u64,
    /// Number of collisions.
    pub collisions: u64,
    /// Number of MPLS packets dropped for an expiring TTL.
    pub mpls_ttl0_dropped: u64,
}

/// Body of reply to `OfpStatsType::PortTable` request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OfpVportTableStats {
    pub max_vports: u32,
    pub active_vports: u32,
    pub lookup_count: u64,
    pub port_match_count: u64,
    pub chain_match_count: u64,
}

/// Add or remove a virtual port (controller -> datapath).
#[derive(Debug, Clone, PartialEq)]
pub struct OfpVportMod {
    /// One of `OfpVportModCommand`.
    pub command: u16,
    /// Virtual port number, from the OFPP_VP_START..OFPP_VP_END range.
    pub vport: u32,
    /// Parent port: a physical port or another virtual port.
    pub parent_port: u32,
    pub actions: Vec<VPortAction>,
}

/// Virtual port table features (datapath -> controller).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfpVportTableFeatures {
    /// Bitmap of supported `OfpVportActionType`s.
    pub actions: u32,
    /// Max number of virtual ports.
    pub max_vports: u32,
    /// Max length of a virtual port chain.
    pub max_chain_depth: u16,
    /// A chain can mix virtual ports with different parents' kinds.
    pub mixed_chaining: bool,
}

/// Error message (datapath -> controller).
#[derive(Debug, PartialEq)]
pub struct OfpErrorMsg {
    pub typ: u16,
    pub code: u16,
    /// Variable-length data. Interpreted based on the type and code. No padding.
    pub data: Vec<u8>,
}

/* Copyright (c) 2008 The Board of Trustees of The Leland Stanford Junior University
 * Copyright (c) 2011, 2012 Open Networking Foundation
 *
 * We are making the OpenFlow specification and associated documentation
 * (Software) available for public use and benefit with the expectation
 * that others will use, modify and enhance the Software and contribute
 * those enhancements back to the community. However, since we would
 * like to make the Software available for broadest use, with as few
 * restrictions as possible permission is hereby granted, free of
 * charge, to any person obtaining a copy of this Software to deal in
 * the Software under the copyrights without restriction, including
 * without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to
 * permit persons to whom the Software is furnished to do so, subject to
 * the following conditions:
 *
 * The above copyright notice and this permission notice shall be
 * included in all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
 * EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
 * MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT.  IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
 * BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
 * ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
 * CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 *
 * The name and trademarks of copyright holder(s) may NOT be used in
 * advertising or publicity pertaining to the Software or any
 * derivatives without specific, written prior permission.
 */

/// Version number:
/// OpenFlow versions released: 0x01 = 1.0 ; 0x02 = 1.1 ; 0x03 = 1.2; 0x04 = 1.3.
///
/// The most significant bit in the version field is reserved and must be set to zero.
pub const OFP_VERSION: u8 = 0x01;

/* Port numbering. Physical ports are numbered starting from 0. */
/// Maximum number of physical switch ports.
pub const OFPP_MAX: u32 = 0xff00;
/// First virtual port number.
pub const OFPP_VP_START: u32 = 0x0001_0000;
/// Last virtual port number.
pub const OFPP_VP_END: u32 = 0xfffe_ffff;

/* Fake output "ports". */
/// Send the packet out the input port. This
/// virtual port must be explicitly used
/// in order to send back out of the input port.
pub const OFPP_IN_PORT: u32 = 0xffff_fff8;
/// Perform actions in flow table.
/// NB: This can only be the destination
/// port for packet-out messages.
pub const OFPP_TABLE: u32 = 0xffff_fff9;
/// Process with normal L2/L3 switching.
pub const OFPP_NORMAL: u32 = 0xffff_fffa;
/// All physical ports except input port and
/// those disabled by STP.
pub const OFPP_FLOOD: u32 = 0xffff_fffb;
/// All physical ports except input port.
pub const OFPP_ALL: u32 = 0xffff_fffc;
/// Send to controller.
pub const OFPP_CONTROLLER: u32 = 0xffff_fffd;
/// Local openflow "port".
pub const OFPP_LOCAL: u32 = 0xffff_fffe;
/// Not associated with a physical port.
pub const OFPP_NONE: u32 = 0xffff_ffff;

/// Checks whether `port` lies in the virtual port range
pub fn is_vport(port: u32) -> bool {
    port >= OFPP_VP_START && port <= OFPP_VP_END
}

/// A message's type, the most fundamental to
/// distinguish information between messages
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpType {
    /* Immutable messages. */
    /// Symmetric message
    Hello = 0,
    /// Symmetric message
    Error = 1,
    /// Symmetric message
    EchoRequest = 2,
    /// Symmetric message
    EchoReply = 3,
    /// Symmetric message
    Vendor = 4,

    /* Switch configuration messages. */
    /// Controller/switch message
    FeaturesRequest = 5,
    /// Controller/switch message
    FeaturesReply = 6,
    /// Controller/switch message
    GetConfigRequest = 7,
    /// Controller/switch message
    GetConfigReply = 8,
    /// Controller/switch message
    SetConfig = 9,

    /* Asynchronous messages. */
    /// Async message
    PacketIn = 10,
    /// Async message
    FlowExpired = 11,
    /// Async message
    PortStatus = 12,

    /* Controller command messages. */
    /// Controller/switch message
    PacketOut = 13,
    /// Controller/switch message
    FlowMod = 14,
    /// Controller/switch message
    PortMod = 15,

    /* Statistics messages. */
    /// Controller/switch message
    StatsRequest = 16,
    /// Controller/switch message
    StatsReply = 17,

    /* Virtual port table messages. */
    /// Controller/switch message
    VportMod = 22,
    /// Controller/switch message
    VportTableFeaturesRequest = 23,
    /// Controller/switch message
    VportTableFeaturesReply = 24,
}

impl OfpType {
    /// Maps the header's type field to an `OfpType`
    pub fn from_u8(typ: u8) -> Option<OfpType> {
        Some(match typ {
            0 => OfpType::Hello,
            1 => OfpType::Error,
            2 => OfpType::EchoRequest,
            3 => OfpType::EchoReply,
            4 => OfpType::Vendor,
            5 => OfpType::FeaturesRequest,
            6 => OfpType::FeaturesReply,
            7 => OfpType::GetConfigRequest,
            8 => OfpType::GetConfigReply,
            9 => OfpType::SetConfig,
            10 => OfpType::PacketIn,
            11 => OfpType::FlowExpired,
            12 => OfpType::PortStatus,
            13 => OfpType::PacketOut,
            14 => OfpType::FlowMod,
            15 => OfpType::PortMod,
            16 => OfpType::StatsRequest,
            17 => OfpType::StatsReply,
            22 => OfpType::VportMod,
            23 => OfpType::VportTableFeaturesRequest,
            24 => OfpType::VportTableFeaturesReply,
            _ => return None,
        })
    }
}

/* Switch configuration flags. */
/// Send flow expiration messages.
pub const OFPC_SEND_FLOW_EXP: u16 = 1 << 0;
/// No special handling for IP fragments.
pub const OFPC_FRAG_NORMAL: u16 = 0 << 1;
/// Drop fragments.
pub const OFPC_FRAG_DROP: u16 = 1 << 1;
/// Reassemble (only if OFPC_IP_REASM set).
pub const OFPC_FRAG_REASM: u16 = 2 << 1;
pub const OFPC_FRAG_MASK: u16 = 3 << 1;

/// Default number of bytes of an unmatched packet sent to the controller.
pub const OFP_DEFAULT_MISS_SEND_LEN: u16 = 128;

/* Capabilities supported by the datapath. */
/// Flow statistics.
pub const OFPC_FLOW_STATS: u32 = 1 << 0;
/// Table statistics.
pub const OFPC_TABLE_STATS: u32 = 1 << 1;
/// Port statistics.
pub const OFPC_PORT_STATS: u32 = 1 << 2;
/// 802.1d spanning tree.
pub const OFPC_STP: u32 = 1 << 3;
/// Supports transmitting through multiple physical interfaces.
pub const OFPC_MULTI_PHY_TX: u32 = 1 << 4;
/// Can reassemble IP fragments.
pub const OFPC_IP_REASM: u32 = 1 << 5;
/// Has a virtual port table.
pub const OFPC_VPORT_TABLE: u32 = 1 << 8;

/* Flags to indicate behavior of the physical port. These flags are
 * used in OfpPhyPort to describe the current configuration. They are
 * used in the OfpPortMod message to configure the port's behavior. */
/// Port is administratively down.
pub const OFPPC_PORT_DOWN: u32 = 1 << 0;
/// Disable 802.1D spanning tree on port.
pub const OFPPC_NO_STP: u32 = 1 << 1;
/// Drop all packets except 802.1D spanning tree packets.
pub const OFPPC_NO_RECV: u32 = 1 << 2;
/// Drop received 802.1D STP packets.
pub const OFPPC_NO_RECV_STP: u32 = 1 << 3;
/// Do not include this port when flooding.
pub const OFPPC_NO_FLOOD: u32 = 1 << 4;
/// Drop packets forwarded to port.
pub const OFPPC_NO_FWD: u32 = 1 << 5;
/// Do not send packet-in msgs for port.
pub const OFPPC_NO_PACKET_IN: u32 = 1 << 6;
pub const OFPPC_ALL: u32 = (1 << 7) - 1;

/* Current state of the physical port. These are not configurable from
 * the controller. */
/// No physical link present.
pub const OFPPS_LINK_DOWN: u32 = 1 << 0;
/// Not learning or relaying frames.
pub const OFPPS_STP_LISTEN: u32 = 0 << 8;
/// Learning but not relaying frames.
pub const OFPPS_STP_LEARN: u32 = 1 << 8;
/// Learning and relaying frames.
pub const OFPPS_STP_FORWARD: u32 = 2 << 8;
/// Not part of spanning tree.
pub const OFPPS_STP_BLOCK: u32 = 3 << 8;
/// Bit mask for OFPPS_STP_* values.
pub const OFPPS_STP_MASK: u32 = 3 << 8;

/// What changed about the physical port
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpPortReason {
    /// The port was added.
    Add = 0,
    /// The port was removed.
    Delete = 1,
    /// Some attribute of the port has changed.
    Modify = 2,
}

/// Why is this packet being sent to the controller?
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpPacketInReason {
    /// No matching flow.
    NoMatch = 0,
    /// Action explicitly output to controller.
    Action = 1,
}

/// Why was this flow removed?
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpFlowExpiredReason {
    /// Flow idle time exceeded idle_timeout.
    IdleTimeout = 0,
    /// Time exceeded hard_timeout.
    HardTimeout = 1,
}

/* ## --------------------- ## */
/* ## OpenFlow Flow Match. ## */
/* ## --------------------- ## */

/* Flow wildcards. */
/// Switch input port.
pub const OFPFW_IN_PORT: u32 = 1 << 0;
/// VLAN id.
pub const OFPFW_DL_VLAN: u32 = 1 << 1;
/// Ethernet source address.
pub const OFPFW_DL_SRC: u32 = 1 << 2;
/// Ethernet destination address.
pub const OFPFW_DL_DST: u32 = 1 << 3;
/// Ethernet frame type.
pub const OFPFW_DL_TYPE: u32 = 1 << 4;
/// IP protocol.
pub const OFPFW_NW_PROTO: u32 = 1 << 5;
/// TCP/UDP source port.
pub const OFPFW_TP_SRC: u32 = 1 << 6;
/// TCP/UDP destination port.
pub const OFPFW_TP_DST: u32 = 1 << 7;

/// IP source address wildcard bit count. 0 is exact match, 1 ignores the
/// LSB, 2 ignores the 2 least-significant bits, ..., 32 and higher wildcard
/// the entire field. This is the *opposite* of the usual convention where
/// e.g. /24 indicates that 8 bits (not 24 bits) are wildcarded.
pub const OFPFW_NW_SRC_SHIFT: u32 = 8;
pub const OFPFW_NW_SRC_BITS: u32 = 6;
pub const OFPFW_NW_SRC_MASK: u32 = ((1 << OFPFW_NW_SRC_BITS) - 1) << OFPFW_NW_SRC_SHIFT;
pub const OFPFW_NW_SRC_ALL: u32 = 32 << OFPFW_NW_SRC_SHIFT;

/// IP destination address wildcard bit count. Same format as source.
pub const OFPFW_NW_DST_SHIFT: u32 = 14;
pub const OFPFW_NW_DST_BITS: u32 = 6;
pub const OFPFW_NW_DST_MASK: u32 = ((1 << OFPFW_NW_DST_BITS) - 1) << OFPFW_NW_DST_SHIFT;
pub const OFPFW_NW_DST_ALL: u32 = 32 << OFPFW_NW_DST_SHIFT;

/// Top MPLS label.
pub const OFPFW_MPLS_L1: u32 = 1 << 20;
/// Second MPLS label.
pub const OFPFW_MPLS_L2: u32 = 1 << 21;

/// Wildcard all fields.
pub const OFPFW_ALL: u32 = (1 << 22) - 1;

/// The VLAN id is 12-bits, so we can use the entire 16 bits to indicate
/// special conditions. All ones is used to match that no VLAN id was
/// set.
pub const OFP_VLAN_NONE: u16 = 0xffff;

/// Label value of a packet that carries no MPLS header.
pub const MPLS_INVALID_LABEL: u32 = 0xffff_ffff;

/// Largest valid MPLS label.
pub const MPLS_MAX_LABEL: u32 = 0x000f_ffff;

/* ## ----------------- ## */
/* ## OpenFlow Actions. ## */
/* ## ----------------- ## */

/// The type of an OpenFlow Action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpActionType {
    /// Output to switch port.
    Output = 0,
    /// Set the 802.1q VLAN id.
    SetVlanVid = 1,
    /// Set the 802.1q priority.
    SetVlanPcp = 2,
    /// Strip the 802.1q header.
    StripVlan = 3,
    /// Ethernet source address.
    SetDlSrc = 4,
    /// Ethernet destination address.
    SetDlDst = 5,
    /// IP source address.
    SetNwSrc = 6,
    /// IP destination address.
    SetNwDst = 7,
    /// TCP/UDP source port.
    SetTpSrc = 9,
    /// TCP/UDP destination port.
    SetTpDst = 10,
    /// MPLS label.
    SetMplsLabel = 12,
    /// MPLS traffic class.
    SetMplsExp = 13,
    /// Vendor extension.
    Vendor = 0xffff,
}

impl OfpActionType {
    pub fn from_u16(typ: u16) -> Option<OfpActionType> {
        Some(match typ {
            0 => OfpActionType::Output,
            1 => OfpActionType::SetVlanVid,
            2 => OfpActionType::SetVlanPcp,
            3 => OfpActionType::StripVlan,
            4 => OfpActionType::SetDlSrc,
            5 => OfpActionType::SetDlDst,
            6 => OfpActionType::SetNwSrc,
            7 => OfpActionType::SetNwDst,
            9 => OfpActionType::SetTpSrc,
            10 => OfpActionType::SetTpDst,
            12 => OfpActionType::SetMplsLabel,
            13 => OfpActionType::SetMplsExp,
            0xffff => OfpActionType::Vendor,
            _ => return None,
        })
    }
}

/// Actions supported by this datapath, as advertised in `OfpSwitchFeatures`.
pub const OFP_SUPPORTED_ACTIONS: u32 = (1 << OfpActionType::Output as u32)
    | (1 << OfpActionType::SetVlanVid as u32)
    | (1 << OfpActionType::SetVlanPcp as u32)
    | (1 << OfpActionType::StripVlan as u32)
    | (1 << OfpActionType::SetDlSrc as u32)
    | (1 << OfpActionType::SetDlDst as u32)
    | (1 << OfpActionType::SetNwSrc as u32)
    | (1 << OfpActionType::SetNwDst as u32)
    | (1 << OfpActionType::SetTpSrc as u32)
    | (1 << OfpActionType::SetTpDst as u32)
    | (1 << OfpActionType::SetMplsLabel as u32)
    | (1 << OfpActionType::SetMplsExp as u32);

/// Length of the action header: type and length
pub const OFP_ACTION_HEADER_LEN: usize = 4;
/// Length of `OfpActionType::Output` and `OfpVportActionType::Output`
pub const OFP_ACTION_OUTPUT_LEN: usize = 16;
/// Length of the address setting actions for Ethernet
pub const OFP_ACTION_DL_ADDR_LEN: usize = 16;
/// Length of every other standard action
pub const OFP_ACTION_SHORT_LEN: usize = 8;

/// The type of a virtual port table action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpVportActionType {
    /// Output to switch port.
    Output = 0,
    /// Remove the top MPLS header.
    PopMpls = 1,
    /// Push a new MPLS header.
    PushMpls = 2,
    /// Set the top MPLS label.
    SetMplsLabel = 3,
    /// Set the top MPLS traffic class.
    SetMplsExp = 4,
}

impl OfpVportActionType {
    pub fn from_u16(typ: u16) -> Option<OfpVportActionType> {
        Some(match typ {
            0 => OfpVportActionType::Output,
            1 => OfpVportActionType::PopMpls,
            2 => OfpVportActionType::PushMpls,
            3 => OfpVportActionType::SetMplsLabel,
            4 => OfpVportActionType::SetMplsExp,
            _ => return None,
        })
    }
}

/// Virtual port actions supported by this datapath.
pub const OFP_SUPPORTED_VPORT_TABLE_ACTIONS: u32 = (1 << OfpVportActionType::Output as u32)
    | (1 << OfpVportActionType::PopMpls as u32)
    | (1 << OfpVportActionType::PushMpls as u32)
    | (1 << OfpVportActionType::SetMplsLabel as u32)
    | (1 << OfpVportActionType::SetMplsExp as u32);

/// Length of `OfpVportActionType::PushMpls`
pub const OFP_VPORT_ACTION_PUSH_MPLS_LEN: usize = 16;

/* Vendor extensions. */
/// Nicira Networks vendor ID
pub const NX_VENDOR_ID: u32 = 0x0000_2320;
/// Ericsson vendor ID
pub const ER_VENDOR_ID: u32 = 0x0000_1320;
/// Length of a vendor action's fixed header: type, length and vendor
pub const OFP_ACTION_VENDOR_HEADER_LEN: usize = 8;
/// Length of every Ericsson action
pub const ER_ACTION_LEN: usize = 16;

/// Subtypes of Ericsson vendor actions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErActionSubtype {
    /// Push a new MPLS header.
    PushMpls = 0,
    /// Remove the top MPLS header.
    PopMpls = 1,
}

/* ## --------------------------- ## */
/* ## OpenFlow Flow Modification. ## */
/* ## --------------------------- ## */

/// The command that is embedded in a flow mod message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpFlowModCommand {
    /// New flow.
    Add = 0,
    /// Modify all matching flows.
    Modify = 1,
    /// Modify entry strictly matching wildcards and priority.
    ModifyStrict = 2,
    /// Delete all matching flows.
    Delete = 3,
    /// Delete entry strictly matching wildcards and priority.
    DeleteStrict = 4,
}

impl OfpFlowModCommand {
    pub fn from_u16(command: u16) -> Option<OfpFlowModCommand> {
        Some(match command {
            0 => OfpFlowModCommand::Add,
            1 => OfpFlowModCommand::Modify,
            2 => OfpFlowModCommand::ModifyStrict,
            3 => OfpFlowModCommand::Delete,
            4 => OfpFlowModCommand::DeleteStrict,
            _ => return None,
        })
    }
}

/// Send flow removed message when flow expires or is deleted.
pub const OFPFF_SEND_FLOW_REM: u16 = 1 << 0;
/// Check for overlapping entries first.
pub const OFPFF_CHECK_OVERLAP: u16 = 1 << 1;

/// Value used in `idle_timeout` and `hard_timeout` to indicate that the entry is permanent.
pub const OFP_FLOW_PERMANENT: u16 = 0;

/// By default, choose a priority in the middle.
pub const OFP_DEFAULT_PRIORITY: u16 = 0x8000;

/// A reserved buffer ID to express that no buffer is assigned
pub const OFP_NO_BUFFER: u32 = 0xffff_ffff;

/// The command that is embedded in a virtual port mod message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpVportModCommand {
    /// New virtual port.
    Add = 0,
    /// Remove a virtual port.
    Delete = 1,
}

/* ## ------------------------ ## */
/* ## OpenFlow Statistics.     ## */
/* ## ------------------------ ## */

/// The kind of statistics requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpStatsType {
    /// Description of this OpenFlow switch.
    /// The request body is empty.
    /// The reply body is `OfpDescStats`.
    Desc = 0,
    /// Individual flow statistics.
    /// The request body is `OfpFlowStatsRequest`.
    /// The reply body is an array of `OfpFlowStats`.
    Flow = 1,
    /// Aggregate flow statistics.
    /// The request body is `OfpFlowStatsRequest`.
    /// The reply body is `OfpAggregateStats`.
    Aggregate = 2,
    /// Flow table statistics.
    /// The request body is empty.
    /// The reply body is an array of `OfpTableStats`.
    Table = 3,
    /// Physical port statistics.
    /// The request body is an array of 32 bit port numbers.
    /// The reply body is an array of `OfpPortStats`.
    Port = 4,
    /// Virtual port table statistics.
    /// The request body is empty.
    /// The reply body is `OfpVportTableStats`.
    PortTable = 5,
    /// Vendor extension.
    Vendor = 0xffff,
}

impl OfpStatsType {
    pub fn from_u16(typ: u16) -> Option<OfpStatsType> {
        Some(match typ {
            0 => OfpStatsType::Desc,
            1 => OfpStatsType::Flow,
            2 => OfpStatsType::Aggregate,
            3 => OfpStatsType::Table,
            4 => OfpStatsType::Port,
            5 => OfpStatsType::PortTable,
            0xffff => OfpStatsType::Vendor,
            _ => return None,
        })
    }
}

/// More replies to follow.
pub const OFPSF_REPLY_MORE: u16 = 1 << 0;

/// Wildcard table used for table config, flow stats and flow deletes.
pub const OFPTT_ALL: u8 = 0xff;

pub const DESC_STR_LEN: usize = 256;
pub const SERIAL_NUM_LEN: usize = 32;
pub const OFP_MAX_TABLE_NAME_LEN: usize = 32;
pub const OFP_MAX_PORT_NAME_LEN: usize = 16;

/* ## ------------------------ ## */
/* ## OpenFlow Errors.         ## */
/* ## ------------------------ ## */

/// Values for 'type' in `OfpErrorMsg`. These values are immutable: they will
/// not change in future versions of the protocol (although new values may be added).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpErrorType {
    /// Hello protocol failed.
    HelloFailed = 0,
    /// Request was not understood.
    BadRequest = 1,
    /// Error in action description.
    BadAction = 2,
    /// Problem modifying flow entry.
    FlowModFailed = 3,
    /// Port mod request failed.
    PortModFailed = 4,
    /// Virtual port mod request failed.
    VportModFailed = 6,
}

impl OfpErrorType {
    pub fn from_u16(typ: u16) -> Option<OfpErrorType> {
        Some(match typ {
            0 => OfpErrorType::HelloFailed,
            1 => OfpErrorType::BadRequest,
            2 => OfpErrorType::BadAction,
            3 => OfpErrorType::FlowModFailed,
            4 => OfpErrorType::PortModFailed,
            6 => OfpErrorType::VportModFailed,
            _ => return None,
        })
    }
}

/// `OfpErrorMsg` 'code' values for `OfpErrorType::BadRequest`.
///
/// 'data' contains at least the first 64 bytes of the failed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpBadRequestCode {
    /// ofp_header.version not supported.
    BadVersion = 0,
    /// ofp_header.type not supported.
    BadType = 1,
    /// OfpStatsRequest.type not supported.
    BadStat = 2,
    /// Vendor not supported.
    BadVendor = 3,
    /// Vendor subtype not supported.
    BadSubtype = 4,
    /// Permissions error.
    Eperm = 5,
    /// Wrong request length for type.
    BadLen = 6,
    /// Specified buffer has already been used.
    BufferEmpty = 7,
    /// Specified buffer does not exist.
    BufferUnknown = 8,
}

/// `OfpErrorMsg` 'code' values for `OfpErrorType::BadAction`.
///
/// 'data' contains at least the first 64 bytes of the failed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpBadActionCode {
    /// Unknown action type.
    BadType = 0,
    /// Length problem in actions.
    BadLen = 1,
    /// Unknown vendor id specified.
    BadVendor = 2,
    /// Unknown action type for vendor id.
    BadVendorType = 3,
    /// Problem validating output action.
    BadOutPort = 4,
    /// Bad action argument.
    BadArgument = 5,
    /// Permissions error.
    Eperm = 6,
    /// Can't handle this many actions.
    TooMany = 7,
}

/// `OfpErrorMsg` 'code' values for `OfpErrorType::FlowModFailed`.
///
/// 'data' contains at least the first 64 bytes of the failed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpFlowModFailedCode {
    /// Flow not added because of full tables.
    AllTablesFull = 0,
    /// Attempted to add overlapping flow with CHECK_OVERLAP flag set.
    Overlap = 1,
    /// Permissions error.
    Eperm = 2,
    /// Flow not added because of non-zero idle/hard timeout.
    BadEmergTimeout = 3,
    /// Unknown command.
    BadCommand = 4,
}

/// `OfpErrorMsg` 'code' values for `OfpErrorType::PortModFailed`.
///
/// 'data' contains at least the first 64 bytes of the failed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpPortModFailedCode {
    /// Specified port does not exist.
    BadPort = 0,
    /// Specified hardware address is wrong.
    BadHwAddr = 1,
}

/// `OfpErrorMsg` 'code' values for `OfpErrorType::VportModFailed`.
///
/// 'data' contains at least the first 64 bytes of the failed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfpVportModFailedCode {
    /// Virtual port number outside of the virtual port range.
    BadVport = 0,
    /// Virtual port number already in use.
    Exists = 1,
    /// Virtual port does not exist.
    Unknown = 2,
    /// The virtual port table is full.
    TableFull = 3,
    /// Unknown command.
    BadCommand = 4,
}
