/*!
Ethernet frames in wire form

A `Packet` owns the frame's bytes together with a small set of offsets
telling where the VLAN tag, the MPLS stack and the network and transport
headers start. Header rewrites patch the bytes in place and keep the
IPv4 and TCP/UDP checksums valid. Rewrites that change the frame's
length (VLAN and MPLS push/pop) recompute the offsets.

The `encode_*` functions build frames for hosts that inject traffic.
*/

use byteorder::{ByteOrder, NetworkEndian};
use checksum::{self, Checksum};

use std::fmt;
use std::net::Ipv4Addr;

pub const ETH_ADDR_LEN: usize = 6;
pub const ETH_HEADER_LEN: usize = 14;
pub const VLAN_HEADER_LEN: usize = 4;
pub const MPLS_HEADER_LEN: usize = 4;
pub const SNAP_HEADER_LEN: usize = 8;
pub const IPV4_HEADER_LEN: usize = 20;
pub const ARP_LEN: usize = 28;
pub const TCP_HEADER_LEN: usize = 20;
pub const UDP_HEADER_LEN: usize = 8;
pub const ICMP_HEADER_LEN: usize = 4;

pub const ETH_TYPE_IP: u16 = 0x0800;
pub const ETH_TYPE_ARP: u16 = 0x0806;
pub const ETH_TYPE_VLAN: u16 = 0x8100;
pub const ETH_TYPE_MPLS: u16 = 0x8847;
pub const ETH_TYPE_MPLS_MCAST: u16 = 0x8848;
/// Type fields below this value are 802.3 length fields
pub const ETH_TYPE_CUTOFF: u16 = 0x0600;
/// The dl_type of an 802.3 frame that has no SNAP header
pub const DL_TYPE_NOT_ETH_TYPE: u16 = 0x05ff;

pub const IP_PROTO_ICMP: u8 = 1;
pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;
const IP_MORE_FRAGMENTS: u16 = 0x2000;
const IP_FRAG_OFF_MASK: u16 = 0x1fff;
const IP_DEFAULT_TTL: u8 = 64;

pub const ARP_OP_REQUEST: u16 = 1;
pub const ARP_OP_REPLY: u16 = 2;

pub const VLAN_VID_MASK: u16 = 0x0fff;
pub const VLAN_PCP_SHIFT: u16 = 13;
pub const VLAN_PCP_MASK: u16 = 0xe000;

pub const MPLS_LABEL_SHIFT: u32 = 12;
pub const MPLS_LABEL_MASK: u32 = 0xffff_f000;
pub const MPLS_EXP_SHIFT: u32 = 9;
pub const MPLS_EXP_MASK: u32 = 0x0000_0e00;
pub const MPLS_STACK_MASK: u32 = 0x0000_0100;
pub const MPLS_TTL_MASK: u32 = 0x0000_00ff;

const LLC_SNAP: [u8; 3] = [0xaa, 0xaa, 0x03];

/// A 48 bit IEEE 802 MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MacAddr(pub [u8; ETH_ADDR_LEN]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; ETH_ADDR_LEN]);

    /// Reads an address from the first six bytes of the slice
    pub fn from_slice(bytes: &[u8]) -> MacAddr {
        let mut addr = [0; ETH_ADDR_LEN];
        addr.copy_from_slice(&bytes[..ETH_ADDR_LEN]);
        MacAddr(addr)
    }

    pub fn is_broadcast(&self) -> bool {
        *self == MacAddr::BROADCAST
    }

    /// Group addresses have the least significant bit of the first octet set
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub fn octets(&self) -> [u8; ETH_ADDR_LEN] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let a = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a[0], a[1], a[2], a[3], a[4], a[5]
        )
    }
}

/// Offsets of the headers inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layers {
    /// Offset of the type field that names the network protocol
    pub type_offset: usize,
    /// The network protocol, looking through VLAN and SNAP encapsulation
    pub dl_type: u16,
    /// Offset of the 802.1Q tag, starting with its TPID
    pub vlan: Option<usize>,
    /// Offset of the topmost MPLS shim header
    pub mpls: Option<usize>,
    pub l3: Option<usize>,
    pub l4: Option<usize>,
    /// The IPv4 header announces a fragment
    pub fragment: bool,
}

impl Layers {
    fn parse(data: &[u8]) -> Layers {
        let mut layers = Layers {
            type_offset: 12,
            ..Layers::default()
        };
        let mut dl_type = NetworkEndian::read_u16(&data[12..14]);
        let mut offset = ETH_HEADER_LEN;

        if dl_type < ETH_TYPE_CUTOFF {
            if data.len() < ETH_HEADER_LEN + SNAP_HEADER_LEN || data[14..17] != LLC_SNAP {
                layers.dl_type = DL_TYPE_NOT_ETH_TYPE;
                return layers;
            }
            layers.type_offset = 20;
            dl_type = NetworkEndian::read_u16(&data[20..22]);
            offset += SNAP_HEADER_LEN;
        }
        else if dl_type == ETH_TYPE_VLAN && data.len() >= offset + VLAN_HEADER_LEN {
            layers.vlan = Some(12);
            layers.type_offset = 16;
            dl_type = NetworkEndian::read_u16(&data[16..18]);
            offset += VLAN_HEADER_LEN;
        }
        layers.dl_type = dl_type;

        match dl_type {
            ETH_TYPE_MPLS | ETH_TYPE_MPLS_MCAST => {
                if data.len() >= offset + MPLS_HEADER_LEN {
                    layers.mpls = Some(offset);
                }
            }
            ETH_TYPE_IP => layers.parse_ipv4(data, offset),
            ETH_TYPE_ARP => {
                if data.len() >= offset + ARP_LEN {
                    layers.l3 = Some(offset);
                }
            }
            _ => {}
        }
        layers
    }

    fn parse_ipv4(&mut self, data: &[u8], offset: usize) {
        if data.len() < offset + IPV4_HEADER_LEN || data[offset] >> 4 != 4 {
            return;
        }
        let ihl = usize::from(data[offset] & 0x0f) * 4;
        if ihl < IPV4_HEADER_LEN || data.len() < offset + ihl {
            return;
        }
        self.l3 = Some(offset);

        let frag = NetworkEndian::read_u16(&data[offset + 6..offset + 8]);
        if frag & (IP_MORE_FRAGMENTS | IP_FRAG_OFF_MASK) != 0 {
            self.fragment = true;
            return;
        }
        let min_len = match data[offset + 9] {
            IP_PROTO_TCP => TCP_HEADER_LEN,
            IP_PROTO_UDP => UDP_HEADER_LEN,
            IP_PROTO_ICMP => ICMP_HEADER_LEN,
            _ => return,
        };
        if data.len() >= offset + ihl + min_len {
            self.l4 = Some(offset + ihl);
        }
    }
}

/// An Ethernet frame and the offsets of its headers
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    data: Vec<u8>,
    layers: Layers,
}

impl Packet {
    /// Wraps a raw frame. Runt frames without a full Ethernet header are refused.
    pub fn parse(data: Vec<u8>) -> Option<Packet> {
        if data.len() < ETH_HEADER_LEN {
            return None;
        }
        let layers = Layers::parse(&data);
        Some(Packet {
            data: data,
            layers: layers,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    fn reparse(&mut self) {
        self.layers = Layers::parse(&self.data);
    }

    fn read_u16(&self, pos: usize) -> u16 {
        NetworkEndian::read_u16(&self.data[pos..pos + 2])
    }

    fn read_u32(&self, pos: usize) -> u32 {
        NetworkEndian::read_u32(&self.data[pos..pos + 4])
    }

    fn write_u16(&mut self, pos: usize, value: u16) {
        NetworkEndian::write_u16(&mut self.data[pos..pos + 2], value)
    }

    fn write_u32(&mut self, pos: usize, value: u32) {
        NetworkEndian::write_u32(&mut self.data[pos..pos + 4], value)
    }

    pub fn eth_dst(&self) -> MacAddr {
        MacAddr::from_slice(&self.data[0..6])
    }

    pub fn eth_src(&self) -> MacAddr {
        MacAddr::from_slice(&self.data[6..12])
    }

    /// The type field right after the addresses, as a NIC sees it
    pub fn outer_type(&self) -> u16 {
        self.read_u16(12)
    }

    pub fn dl_type(&self) -> u16 {
        self.layers.dl_type
    }

    pub fn vlan_tci(&self) -> Option<u16> {
        self.layers.vlan.map(|tag| self.read_u16(tag + 2))
    }

    /// The topmost MPLS shim header
    pub fn mpls_shim(&self) -> Option<u32> {
        self.layers.mpls.map(|pos| self.read_u32(pos))
    }

    /// The shim header below the topmost one, if the top is not the bottom of stack
    pub fn mpls_second_shim(&self) -> Option<u32> {
        let pos = self.layers.mpls?;
        let top = self.read_u32(pos);
        if top & MPLS_STACK_MASK != 0 || self.data.len() < pos + 2 * MPLS_HEADER_LEN {
            return None;
        }
        Some(self.read_u32(pos + MPLS_HEADER_LEN))
    }

    pub fn mpls_ttl(&self) -> Option<u8> {
        self.mpls_shim().map(|shim| (shim & MPLS_TTL_MASK) as u8)
    }

    fn ipv4_offset(&self) -> Option<usize> {
        if self.layers.dl_type == ETH_TYPE_IP {
            self.layers.l3
        }
        else {
            None
        }
    }

    pub fn ipv4_src(&self) -> Option<u32> {
        self.ipv4_offset().map(|l3| self.read_u32(l3 + 12))
    }

    pub fn ipv4_dst(&self) -> Option<u32> {
        self.ipv4_offset().map(|l3| self.read_u32(l3 + 16))
    }

    pub fn ip_proto(&self) -> Option<u8> {
        self.ipv4_offset().map(|l3| self.data[l3 + 9])
    }

    pub fn ip_ttl(&self) -> Option<u8> {
        self.ipv4_offset().map(|l3| self.data[l3 + 8])
    }

    /// ARP opcode with the sender and target protocol addresses
    pub fn arp(&self) -> Option<(u16, u32, u32)> {
        if self.layers.dl_type != ETH_TYPE_ARP {
            return None;
        }
        self.layers
            .l3
            .map(|l3| (self.read_u16(l3 + 6), self.read_u32(l3 + 14), self.read_u32(l3 + 24)))
    }

    /// Source and destination ports for TCP and UDP, type and code for ICMP
    pub fn transport_ports(&self) -> Option<(u16, u16)> {
        let l4 = self.layers.l4?;
        match self.ip_proto()? {
            IP_PROTO_TCP | IP_PROTO_UDP => Some((self.read_u16(l4), self.read_u16(l4 + 2))),
            IP_PROTO_ICMP => Some((u16::from(self.data[l4]), u16::from(self.data[l4 + 1]))),
            _ => None,
        }
    }

    pub fn set_eth_src(&mut self, addr: MacAddr) {
        self.data[6..12].copy_from_slice(&addr.0);
    }

    pub fn set_eth_dst(&mut self, addr: MacAddr) {
        self.data[0..6].copy_from_slice(&addr.0);
    }

    /// Replaces the TCI bits selected by `mask`.
    /// An untagged frame gets a new 802.1Q tag whose other bits are zero.
    pub fn set_vlan_tci(&mut self, tci: u16, mask: u16) {
        match self.layers.vlan {
            Some(tag) => {
                let old = self.read_u16(tag + 2);
                self.write_u16(tag + 2, (old & !mask) | (tci & mask));
            }
            None => {
                let mut tag = [0; VLAN_HEADER_LEN];
                NetworkEndian::write_u16(&mut tag[0..2], ETH_TYPE_VLAN);
                NetworkEndian::write_u16(&mut tag[2..4], tci & mask);
                self.insert_bytes(12, &tag);
            }
        }
    }

    pub fn strip_vlan(&mut self) {
        if let Some(tag) = self.layers.vlan {
            self.data.drain(tag..tag + VLAN_HEADER_LEN);
            self.reparse();
        }
    }

    fn insert_bytes(&mut self, pos: usize, bytes: &[u8]) {
        let tail = self.data.split_off(pos);
        self.data.extend_from_slice(bytes);
        self.data.extend_from_slice(&tail);
        self.reparse();
    }

    pub fn set_ipv4_src(&mut self, addr: u32) {
        self.set_ipv4_addr(12, addr)
    }

    pub fn set_ipv4_dst(&mut self, addr: u32) {
        self.set_ipv4_addr(16, addr)
    }

    fn set_ipv4_addr(&mut self, field: usize, addr: u32) {
        let l3 = match self.ipv4_offset() {
            Some(l3) => l3,
            None => return,
        };
        let old = self.read_u32(l3 + field);
        let csum = self.read_u16(l3 + 10);
        self.write_u16(l3 + 10, checksum::update_u32(csum, old, addr));
        // the addresses are part of the TCP and UDP pseudo header
        if let Some(pos) = self.l4_checksum_offset() {
            let stored = self.read_u16(pos);
            self.write_l4_checksum(pos, checksum::update_u32(stored, old, addr));
        }
        self.write_u32(l3 + field, addr);
    }

    /// Rewrites the TCP or UDP source port. Returns false for any other protocol.
    pub fn set_tp_src(&mut self, port: u16) -> bool {
        self.set_tp_port(0, port)
    }

    pub fn set_tp_dst(&mut self, port: u16) -> bool {
        self.set_tp_port(2, port)
    }

    fn set_tp_port(&mut self, field: usize, port: u16) -> bool {
        let (l4, pos) = match (self.layers.l4, self.l4_checksum_offset()) {
            (Some(l4), Some(pos)) => (l4, pos),
            _ => return false,
        };
        let old = self.read_u16(l4 + field);
        let stored = self.read_u16(pos);
        self.write_l4_checksum(pos, checksum::update_u16(stored, old, port));
        self.write_u16(l4 + field, port);
        true
    }

    /// Position of the checksum field in a TCP or UDP header
    fn l4_checksum_offset(&self) -> Option<usize> {
        let l4 = self.layers.l4?;
        match self.ip_proto()? {
            IP_PROTO_TCP => Some(l4 + 16),
            IP_PROTO_UDP => Some(l4 + 6),
            _ => None,
        }
    }

    fn write_l4_checksum(&mut self, pos: usize, csum: u16) {
        if self.ip_proto() == Some(IP_PROTO_UDP) {
            // a zero UDP checksum means none was computed
            if self.read_u16(pos) == 0 {
                return;
            }
            if csum == 0 {
                self.write_u16(pos, 0xffff);
                return;
            }
        }
        self.write_u16(pos, csum);
    }

    pub fn set_mpls_label(&mut self, label: u32) {
        if let Some(pos) = self.layers.mpls {
            let shim = self.read_u32(pos);
            let label = (label << MPLS_LABEL_SHIFT) & MPLS_LABEL_MASK;
            self.write_u32(pos, (shim & !MPLS_LABEL_MASK) | label);
        }
    }

    pub fn set_mpls_exp(&mut self, exp: u8) {
        if let Some(pos) = self.layers.mpls {
            let shim = self.read_u32(pos);
            let exp = (u32::from(exp) << MPLS_EXP_SHIFT) & MPLS_EXP_MASK;
            self.write_u32(pos, (shim & !MPLS_EXP_MASK) | exp);
        }
    }

    /// Pushes a new top MPLS shim header.
    /// A zero `ttl` inherits the TTL of the previous top label or of the IPv4 header.
    pub fn push_mpls(&mut self, label: u32, exp: u8, ttl: u8) {
        let ttl = if ttl != 0 {
            ttl
        }
        else {
            self.mpls_ttl().or_else(|| self.ip_ttl()).unwrap_or(IP_DEFAULT_TTL)
        };
        let bottom = if self.layers.mpls.is_some() { 0 } else { MPLS_STACK_MASK };
        let shim = ((label << MPLS_LABEL_SHIFT) & MPLS_LABEL_MASK)
            | ((u32::from(exp) << MPLS_EXP_SHIFT) & MPLS_EXP_MASK)
            | bottom
            | u32::from(ttl);

        let type_offset = self.layers.type_offset;
        if self.layers.mpls.is_none() {
            self.write_u16(type_offset, ETH_TYPE_MPLS);
        }
        let mut bytes = [0; MPLS_HEADER_LEN];
        NetworkEndian::write_u32(&mut bytes, shim);
        self.insert_bytes(type_offset + 2, &bytes);
    }

    /// Pops the top MPLS shim header.
    /// Popping the bottom of stack sets the type field to `eth_type`.
    pub fn pop_mpls(&mut self, eth_type: u16) {
        let pos = match self.layers.mpls {
            Some(pos) => pos,
            None => return,
        };
        let shim = self.read_u32(pos);
        if shim & MPLS_STACK_MASK != 0 {
            let type_offset = self.layers.type_offset;
            self.write_u16(type_offset, eth_type);
        }
        self.data.drain(pos..pos + MPLS_HEADER_LEN);
        self.reparse();
    }
}

/// Encodes an Ethernet II frame
pub fn encode_ethernet(dst: MacAddr, src: MacAddr, eth_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0; ETH_HEADER_LEN];
    frame[0..6].copy_from_slice(&dst.0);
    frame[6..12].copy_from_slice(&src.0);
    NetworkEndian::write_u16(&mut frame[12..14], eth_type);
    frame.extend_from_slice(payload);
    frame
}

/// Encodes an IPv4 packet without options and with a valid header checksum
pub fn encode_ipv4(src: Ipv4Addr, dst: Ipv4Addr, proto: u8, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0; IPV4_HEADER_LEN];
    packet[0] = 0x45;
    NetworkEndian::write_u16(&mut packet[2..4], (IPV4_HEADER_LEN + payload.len()) as u16);
    packet[8] = IP_DEFAULT_TTL;
    packet[9] = proto;
    packet[12..16].copy_from_slice(&src.octets());
    packet[16..20].copy_from_slice(&dst.octets());
    let csum = Checksum::compute(&packet).finalize();
    NetworkEndian::write_u16(&mut packet[10..12], csum);
    packet.extend_from_slice(payload);
    packet
}

fn pseudo_header_checksum(src: Ipv4Addr, dst: Ipv4Addr, proto: u8, segment: &[u8]) -> u16 {
    let mut csum = Checksum::default();
    csum.add(&src.octets());
    csum.add(&dst.octets());
    csum.add_u16(u16::from(proto));
    csum.add_u16(segment.len() as u16);
    csum.add(segment);
    csum.finalize()
}

/// Encodes a UDP datagram whose checksum covers the IPv4 pseudo header
pub fn encode_udp(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut segment = vec![0; UDP_HEADER_LEN];
    NetworkEndian::write_u16(&mut segment[0..2], src_port);
    NetworkEndian::write_u16(&mut segment[2..4], dst_port);
    NetworkEndian::write_u16(&mut segment[4..6], (UDP_HEADER_LEN + payload.len()) as u16);
    segment.extend_from_slice(payload);
    let csum = match pseudo_header_checksum(src, dst, IP_PROTO_UDP, &segment) {
        0 => 0xffff,
        c => c,
    };
    NetworkEndian::write_u16(&mut segment[6..8], csum);
    segment
}

/// Encodes a TCP segment without options carrying only the SYN flag
pub fn encode_tcp(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut segment = vec![0; TCP_HEADER_LEN];
    NetworkEndian::write_u16(&mut segment[0..2], src_port);
    NetworkEndian::write_u16(&mut segment[2..4], dst_port);
    segment[12] = 5 << 4;
    segment[13] = 0x02;
    NetworkEndian::write_u16(&mut segment[14..16], 0xffff);
    segment.extend_from_slice(payload);
    let csum = pseudo_header_checksum(src, dst, IP_PROTO_TCP, &segment);
    NetworkEndian::write_u16(&mut segment[16..18], csum);
    segment
}

/// Encodes an Ethernet/IPv4 ARP message
pub fn encode_arp(op: u16, sha: MacAddr, spa: Ipv4Addr, tha: MacAddr, tpa: Ipv4Addr) -> Vec<u8> {
    let mut arp = vec![0; ARP_LEN];
    NetworkEndian::write_u16(&mut arp[0..2], 1);
    NetworkEndian::write_u16(&mut arp[2..4], ETH_TYPE_IP);
    arp[4] = ETH_ADDR_LEN as u8;
    arp[5] = 4;
    NetworkEndian::write_u16(&mut arp[6..8], op);
    arp[8..14].copy_from_slice(&sha.0);
    arp[14..18].copy_from_slice(&spa.octets());
    arp[18..24].copy_from_slice(&tha.0);
    arp[24..28].copy_from_slice(&tpa.octets());
    arp
}

/// Encodes a complete Ethernet/IPv4/UDP frame
pub fn encode_udp_frame(
    dst: MacAddr,
    src: MacAddr,
    ip_src: Ipv4Addr,
    ip_dst: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let udp = encode_udp(ip_src, ip_dst, src_port, dst_port, payload);
    let ip = encode_ipv4(ip_src, ip_dst, IP_PROTO_UDP, &udp);
    encode_ethernet(dst, src, ETH_TYPE_IP, &ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAC_A: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xa]);
    const MAC_B: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xb]);

    fn udp_frame() -> Packet {
        let frame = encode_udp_frame(
            MAC_B,
            MAC_A,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            1000,
            2000,
            b"hello",
        );
        Packet::parse(frame).unwrap()
    }

    fn ip_checksum_ok(p: &Packet) -> bool {
        let l3 = p.layers().l3.unwrap();
        Checksum::compute(&p.data()[l3..l3 + IPV4_HEADER_LEN]).finalize() == 0
    }

    fn udp_checksum_ok(p: &Packet) -> bool {
        let l4 = p.layers().l4.unwrap();
        let src = Ipv4Addr::from(p.ipv4_src().unwrap());
        let dst = Ipv4Addr::from(p.ipv4_dst().unwrap());
        pseudo_header_checksum(src, dst, IP_PROTO_UDP, &p.data()[l4..]) == 0
    }

    #[test]
    fn runt_frame_is_refused() {
        assert!(Packet::parse(vec![0; 13]).is_none());
    }

    #[test]
    fn udp_layers() {
        let p = udp_frame();
        assert_eq!(ETH_TYPE_IP, p.dl_type());
        assert_eq!(Some(14), p.layers().l3);
        assert_eq!(Some(34), p.layers().l4);
        assert_eq!(Some((1000, 2000)), p.transport_ports());
        assert_eq!(MAC_A, p.eth_src());
        assert_eq!(MAC_B, p.eth_dst());
        assert!(ip_checksum_ok(&p));
        assert!(udp_checksum_ok(&p));
    }

    #[test]
    fn snap_frame_type() {
        let mut payload = vec![0xaa, 0xaa, 0x03, 0, 0, 0, 0x08, 0x06];
        payload.extend_from_slice(&encode_arp(
            ARP_OP_REQUEST,
            MAC_A,
            Ipv4Addr::new(10, 0, 0, 1),
            MacAddr::default(),
            Ipv4Addr::new(10, 0, 0, 2),
        ));
        let len = payload.len() as u16;
        let p = Packet::parse(encode_ethernet(MAC_B, MAC_A, len, &payload)).unwrap();
        assert_eq!(ETH_TYPE_ARP, p.dl_type());
        assert_eq!(Some((ARP_OP_REQUEST, 0x0a00_0001, 0x0a00_0002)), p.arp());

        let p = Packet::parse(encode_ethernet(MAC_B, MAC_A, 4, &[1, 2, 3, 4])).unwrap();
        assert_eq!(DL_TYPE_NOT_ETH_TYPE, p.dl_type());
    }

    #[test]
    fn fragments_have_no_transport_header() {
        let mut frame = udp_frame().into_data();
        // more fragments flag
        frame[14 + 6] = 0x20;
        let p = Packet::parse(frame).unwrap();
        assert!(p.layers().fragment);
        assert_eq!(None, p.layers().l4);
    }

    #[test]
    fn vlan_push_modify_strip() {
        let mut p = udp_frame();
        let len = p.len();
        p.set_vlan_tci(42, VLAN_VID_MASK);
        assert_eq!(len + VLAN_HEADER_LEN, p.len());
        assert_eq!(Some(42), p.vlan_tci());
        assert_eq!(ETH_TYPE_IP, p.dl_type());
        assert_eq!(Some((1000, 2000)), p.transport_ports());

        p.set_vlan_tci(5 << VLAN_PCP_SHIFT, VLAN_PCP_MASK);
        assert_eq!(Some(5 << VLAN_PCP_SHIFT | 42), p.vlan_tci());

        p.strip_vlan();
        assert_eq!(None, p.vlan_tci());
        assert_eq!(udp_frame(), p);
    }

    #[test]
    fn address_rewrite_keeps_checksums() {
        let mut p = udp_frame();
        p.set_ipv4_dst(0xc0a8_0101);
        p.set_ipv4_src(0xc0a8_0102);
        p.set_tp_dst(53);
        assert_eq!(Some(0xc0a8_0101), p.ipv4_dst());
        assert_eq!(Some((1000, 53)), p.transport_ports());
        assert!(ip_checksum_ok(&p));
        assert!(udp_checksum_ok(&p));
    }

    #[test]
    fn mpls_push_set_pop() {
        let mut p = udp_frame();
        p.push_mpls(100, 0, 0);
        assert_eq!(ETH_TYPE_MPLS, p.dl_type());
        let shim = p.mpls_shim().unwrap();
        assert_eq!(100, shim >> MPLS_LABEL_SHIFT);
        assert!(shim & MPLS_STACK_MASK != 0);
        assert_eq!(Some(IP_DEFAULT_TTL), p.mpls_ttl());

        p.push_mpls(200, 1, 7);
        assert_eq!(Some(7), p.mpls_ttl());
        let second = p.mpls_second_shim().unwrap();
        assert_eq!(100, second >> MPLS_LABEL_SHIFT);

        p.set_mpls_label(300);
        p.set_mpls_exp(3);
        let shim = p.mpls_shim().unwrap();
        assert_eq!(300, shim >> MPLS_LABEL_SHIFT);
        assert_eq!(3, (shim & MPLS_EXP_MASK) >> MPLS_EXP_SHIFT);

        p.pop_mpls(ETH_TYPE_IP);
        assert_eq!(ETH_TYPE_MPLS, p.dl_type());
        p.pop_mpls(ETH_TYPE_IP);
        assert_eq!(udp_frame(), p);
    }

    #[test]
    fn mac_display() {
        assert_eq!("00:00:00:00:00:0a", MAC_A.to_string());
        assert!(MacAddr::BROADCAST.is_multicast());
        assert!(!MAC_A.is_multicast());
    }
}
