/*!
Flow keys and wildcard matches

A `FlowKey` is extracted from every received frame and holds the header
fields a flow entry can match on. A `MatchKey` pairs a key with the
`OFPFW_*` wildcard bitmap of a flow entry or of a controller request.
*/

use ipnetwork::Ipv4Network;
use openflow::messages::*;
use packet::{self, MacAddr, Packet};

use std::net::Ipv4Addr;

/// The header fields of one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FlowKey {
    pub in_port: u32,
    pub dl_src: MacAddr,
    pub dl_dst: MacAddr,
    /// VLAN id, or OFP_VLAN_NONE for untagged frames
    pub dl_vlan: u16,
    pub dl_type: u16,
    pub nw_src: u32,
    pub nw_dst: u32,
    /// IP protocol, or the lower 8 bits of the ARP opcode
    pub nw_proto: u8,
    /// TCP/UDP source port, or the ICMP type
    pub tp_src: u16,
    /// TCP/UDP destination port, or the ICMP code
    pub tp_dst: u16,
    /// Top MPLS label, or MPLS_INVALID_LABEL
    pub mpls_label1: u32,
    /// Second MPLS label, or MPLS_INVALID_LABEL
    pub mpls_label2: u32,
}

impl FlowKey {
    /// Extracts the key of `packet` received on `in_port`
    pub fn extract(packet: &Packet, in_port: u32) -> FlowKey {
        let mut key = FlowKey {
            in_port: in_port,
            dl_src: packet.eth_src(),
            dl_dst: packet.eth_dst(),
            dl_vlan: OFP_VLAN_NONE,
            dl_type: packet.dl_type(),
            mpls_label1: MPLS_INVALID_LABEL,
            mpls_label2: MPLS_INVALID_LABEL,
            ..FlowKey::default()
        };
        if let Some(tci) = packet.vlan_tci() {
            key.dl_vlan = tci & packet::VLAN_VID_MASK;
        }

        if let Some(shim) = packet.mpls_shim() {
            key.mpls_label1 = shim >> packet::MPLS_LABEL_SHIFT;
            if let Some(second) = packet.mpls_second_shim() {
                key.mpls_label2 = second >> packet::MPLS_LABEL_SHIFT;
            }
        }
        else if let (Some(src), Some(dst), Some(proto)) =
            (packet.ipv4_src(), packet.ipv4_dst(), packet.ip_proto())
        {
            key.nw_src = src;
            key.nw_dst = dst;
            key.nw_proto = proto;
            if let Some((tp_src, tp_dst)) = packet.transport_ports() {
                key.tp_src = tp_src;
                key.tp_dst = tp_dst;
            }
        }
        else if let Some((op, spa, tpa)) = packet.arp() {
            if op <= 0xff {
                key.nw_proto = op as u8;
            }
            key.nw_src = spa;
            key.nw_dst = tpa;
        }
        key
    }
}

/// A flow key whose fields are partially ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchKey {
    /// Bitmap of OFPFW_* flags
    pub wildcards: u32,
    pub flow: FlowKey,
}

impl MatchKey {
    /// Constructs a match. Fields that are wildcarded are zeroed,
    /// so two matches selecting the same packets compare equal.
    pub fn new(wildcards: u32, flow: FlowKey) -> MatchKey {
        let wildcards = wildcards & OFPFW_ALL;
        let mut flow = flow;
        if wildcards & OFPFW_IN_PORT != 0 {
            flow.in_port = 0;
        }
        if wildcards & OFPFW_DL_VLAN != 0 {
            flow.dl_vlan = 0;
        }
        if wildcards & OFPFW_DL_SRC != 0 {
            flow.dl_src = MacAddr::default();
        }
        if wildcards & OFPFW_DL_DST != 0 {
            flow.dl_dst = MacAddr::default();
        }
        if wildcards & OFPFW_DL_TYPE != 0 {
            flow.dl_type = 0;
        }
        if wildcards & OFPFW_NW_PROTO != 0 {
            flow.nw_proto = 0;
        }
        if wildcards & OFPFW_TP_SRC != 0 {
            flow.tp_src = 0;
        }
        if wildcards & OFPFW_TP_DST != 0 {
            flow.tp_dst = 0;
        }
        if wildcards & OFPFW_MPLS_L1 != 0 {
            flow.mpls_label1 = 0;
        }
        if wildcards & OFPFW_MPLS_L2 != 0 {
            flow.mpls_label2 = 0;
        }
        let mut key = MatchKey {
            wildcards: wildcards,
            flow: flow,
        };
        key.flow.nw_src &= prefix_mask(key.nw_src_prefix());
        key.flow.nw_dst &= prefix_mask(key.nw_dst_prefix());
        key
    }

    /// A match without any wildcards
    pub fn exact(flow: FlowKey) -> MatchKey {
        MatchKey {
            wildcards: 0,
            flow: flow,
        }
    }

    /// A match that selects every packet
    pub fn all() -> MatchKey {
        MatchKey::new(OFPFW_ALL, FlowKey::default())
    }

    pub fn is_exact(&self) -> bool {
        self.wildcards & OFPFW_ALL == 0
    }

    /// Length of the IPv4 source prefix that has to match
    pub fn nw_src_prefix(&self) -> u8 {
        let bits = (self.wildcards & OFPFW_NW_SRC_MASK) >> OFPFW_NW_SRC_SHIFT;
        32 - bits.min(32) as u8
    }

    /// Length of the IPv4 destination prefix that has to match
    pub fn nw_dst_prefix(&self) -> u8 {
        let bits = (self.wildcards & OFPFW_NW_DST_MASK) >> OFPFW_NW_DST_SHIFT;
        32 - bits.min(32) as u8
    }

    /// Checks whether `key` agrees with this match on every field that is not wildcarded
    pub fn matches(&self, key: &FlowKey) -> bool {
        let w = self.wildcards;
        let f = &self.flow;
        (w & OFPFW_IN_PORT != 0 || f.in_port == key.in_port)
            && (w & OFPFW_DL_VLAN != 0 || f.dl_vlan == key.dl_vlan)
            && (w & OFPFW_DL_SRC != 0 || f.dl_src == key.dl_src)
            && (w & OFPFW_DL_DST != 0 || f.dl_dst == key.dl_dst)
            && (w & OFPFW_DL_TYPE != 0 || f.dl_type == key.dl_type)
            && (w & OFPFW_NW_PROTO != 0 || f.nw_proto == key.nw_proto)
            && (w & OFPFW_TP_SRC != 0 || f.tp_src == key.tp_src)
            && (w & OFPFW_TP_DST != 0 || f.tp_dst == key.tp_dst)
            && (w & OFPFW_MPLS_L1 != 0 || f.mpls_label1 == key.mpls_label1)
            && (w & OFPFW_MPLS_L2 != 0 || f.mpls_label2 == key.mpls_label2)
            && prefix_contains(f.nw_src, self.nw_src_prefix(), key.nw_src)
            && prefix_contains(f.nw_dst, self.nw_dst_prefix(), key.nw_dst)
    }

    /// Checks whether `other` has the same wildcards and agrees on every remaining field
    pub fn strictly_equals(&self, other: &MatchKey) -> bool {
        self.wildcards == other.wildcards && self.matches(&other.flow)
    }
}

fn prefix_mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    }
    else {
        !0u32 << (32 - u32::from(prefix))
    }
}

fn prefix_contains(net: u32, prefix: u8, addr: u32) -> bool {
    match Ipv4Network::new(Ipv4Addr::from(net), prefix) {
        Ok(network) => network.contains(Ipv4Addr::from(addr)),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packet::*;

    const MAC_A: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xa]);
    const MAC_B: MacAddr = MacAddr([0, 0, 0, 0, 0, 0xb]);

    fn udp_key() -> FlowKey {
        let frame = encode_udp_frame(
            MAC_B,
            MAC_A,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 1, 2),
            1000,
            53,
            b"query",
        );
        FlowKey::extract(&Packet::parse(frame).unwrap(), 3)
    }

    #[test]
    fn extract_udp() {
        let key = udp_key();
        assert_eq!(3, key.in_port);
        assert_eq!(MAC_A, key.dl_src);
        assert_eq!(MAC_B, key.dl_dst);
        assert_eq!(OFP_VLAN_NONE, key.dl_vlan);
        assert_eq!(ETH_TYPE_IP, key.dl_type);
        assert_eq!(0x0a00_0001, key.nw_src);
        assert_eq!(0x0a00_0102, key.nw_dst);
        assert_eq!(IP_PROTO_UDP, key.nw_proto);
        assert_eq!((1000, 53), (key.tp_src, key.tp_dst));
        assert_eq!(MPLS_INVALID_LABEL, key.mpls_label1);
    }

    #[test]
    fn extract_arp() {
        let arp = encode_arp(
            ARP_OP_REQUEST,
            MAC_A,
            Ipv4Addr::new(10, 0, 0, 1),
            MacAddr::default(),
            Ipv4Addr::new(10, 0, 0, 2),
        );
        let frame = encode_ethernet(MacAddr::BROADCAST, MAC_A, ETH_TYPE_ARP, &arp);
        let key = FlowKey::extract(&Packet::parse(frame).unwrap(), 0);
        assert_eq!(ETH_TYPE_ARP, key.dl_type);
        assert_eq!(ARP_OP_REQUEST as u8, key.nw_proto);
        assert_eq!(0x0a00_0001, key.nw_src);
        assert_eq!(0x0a00_0002, key.nw_dst);
    }

    #[test]
    fn extract_mpls_labels() {
        let mut packet = Packet::parse(udp_key_frame()).unwrap();
        packet.push_mpls(100, 0, 64);
        packet.push_mpls(200, 0, 64);
        let key = FlowKey::extract(&packet, 0);
        assert_eq!(200, key.mpls_label1);
        assert_eq!(100, key.mpls_label2);
        assert_eq!(0, key.nw_src);
    }

    fn udp_key_frame() -> Vec<u8> {
        encode_udp_frame(
            MAC_B,
            MAC_A,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 1, 2),
            1000,
            53,
            b"query",
        )
    }

    #[test]
    fn exact_match() {
        let key = udp_key();
        let testee = MatchKey::exact(key);
        assert!(testee.is_exact());
        assert!(testee.matches(&key));

        let mut swapped = key;
        swapped.dl_src = key.dl_dst;
        swapped.dl_dst = key.dl_src;
        assert!(!testee.matches(&swapped));
    }

    #[test]
    fn wildcard_match_zeroes_ignored_fields() {
        let key = udp_key();
        let testee = MatchKey::new(OFPFW_ALL & !OFPFW_DL_DST, key);
        assert_eq!(MacAddr::default(), testee.flow.dl_src);
        assert_eq!(0, testee.flow.tp_dst);
        assert!(testee.matches(&key));

        let mut other = key;
        other.dl_src = MacAddr::BROADCAST;
        other.in_port = 9;
        assert!(testee.matches(&other));
        other.dl_dst = MAC_A;
        assert!(!testee.matches(&other));
    }

    #[test]
    fn nw_prefix_match() {
        let key = udp_key();
        // match 10.0.0.0/16 on the destination
        let wildcards = (OFPFW_ALL & !OFPFW_NW_DST_MASK) | (16 << OFPFW_NW_DST_SHIFT);
        let testee = MatchKey::new(wildcards, key);
        assert_eq!(16, testee.nw_dst_prefix());
        assert_eq!(0, testee.nw_src_prefix());
        assert_eq!(0x0a00_0000, testee.flow.nw_dst);
        assert!(testee.matches(&key));

        let mut other = key;
        other.nw_dst = 0x0a00_ff01;
        assert!(testee.matches(&other));
        other.nw_dst = 0x0a01_0001;
        assert!(!testee.matches(&other));
    }

    #[test]
    fn match_all() {
        let testee = MatchKey::all();
        assert!(!testee.is_exact());
        assert!(testee.matches(&udp_key()));
        assert!(testee.matches(&FlowKey::default()));
    }

    #[test]
    fn strict_equality_requires_same_wildcards() {
        let key = udp_key();
        let a = MatchKey::new(OFPFW_ALL & !OFPFW_DL_DST, key);
        let b = MatchKey::new(OFPFW_ALL & !OFPFW_DL_DST & !OFPFW_DL_SRC, key);
        assert!(a.strictly_equals(&a));
        assert!(!a.strictly_equals(&b));
        // b is narrower, so a covers it non-strictly
        assert!(a.matches(&b.flow));
    }
}
