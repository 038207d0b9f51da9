/*!
Flow and virtual port actions

Actions are validated once when a flow is installed or a Packet-Out
arrives, and executed for every packet afterwards. Header rewrites are
cumulative: every output sees the packet as modified by the actions
before it.
*/

use flow::{FlowKey, MatchKey};
use openflow::messages::*;
use packet::{self, MacAddr, Packet};

/// An action of a flow entry or a Packet-Out
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Output to a port. `max_len` limits the bytes sent to the controller.
    Output { port: u32, max_len: u16 },
    SetVlanVid(u16),
    SetVlanPcp(u8),
    StripVlan,
    SetDlSrc(MacAddr),
    SetDlDst(MacAddr),
    SetNwSrc(u32),
    SetNwDst(u32),
    SetTpSrc(u16),
    SetTpDst(u16),
    SetMplsLabel(u32),
    SetMplsExp(u8),
    Vendor(VendorAction),
}

/// Actions that are defined by a vendor extension
#[derive(Debug, Clone, PartialEq)]
pub enum VendorAction {
    Ericsson(ErAction),
}

/// The Ericsson MPLS extension
#[derive(Debug, Clone, PartialEq)]
pub enum ErAction {
    /// A zero `ttl` is inherited from the packet
    PushMpls { label: u32, exp: u8, ttl: u8 },
    /// `eth_type` replaces the type field when the bottom of stack is popped
    PopMpls { eth_type: u16 },
}

/// An action of a virtual port
#[derive(Debug, Clone, PartialEq)]
pub enum VPortAction {
    Output { port: u32, max_len: u16 },
    PopMpls { eth_type: u16 },
    PushMpls { label: u32, exp: u8, ttl: u8 },
    SetMplsLabel(u32),
    SetMplsExp(u8),
}

/// The receiver of the packets that actions output
pub trait ActionSink {
    /// Sends a copy of `packet` to `out_port`, which may be a pseudo or virtual port.
    /// `ignore_no_fwd` is set for Packet-Out, which may send to ports with OFPPC_NO_FWD.
    fn output(
        &mut self,
        packet: &Packet,
        key: &FlowKey,
        out_port: u32,
        max_len: u16,
        ignore_no_fwd: bool,
    );
}

fn validate_output(port: u32, key: &MatchKey, allow_table: bool) -> Result<(), OfpBadActionCode> {
    match port {
        OFPP_NONE | OFPP_NORMAL | OFPP_LOCAL => Err(OfpBadActionCode::BadOutPort),
        OFPP_TABLE if !allow_table => Err(OfpBadActionCode::BadOutPort),
        OFPP_TABLE | OFPP_IN_PORT | OFPP_FLOOD | OFPP_ALL | OFPP_CONTROLLER => Ok(()),
        // the ingress port has to be addressed as OFPP_IN_PORT
        p if key.wildcards & OFPFW_IN_PORT == 0 && p == key.flow.in_port => {
            Err(OfpBadActionCode::BadOutPort)
        }
        p if p < OFPP_MAX || is_vport(p) => Ok(()),
        _ => Err(OfpBadActionCode::BadOutPort),
    }
}

fn validate_mpls(label: u32, exp: u8) -> Result<(), OfpBadActionCode> {
    if label > MPLS_MAX_LABEL || exp > 7 {
        return Err(OfpBadActionCode::BadArgument);
    }
    Ok(())
}

/// Checks an action list before it is installed or executed.
/// `allow_table` permits output to OFPP_TABLE, which only Packet-Out may use.
pub fn validate_actions(
    actions: &[Action],
    key: &MatchKey,
    allow_table: bool,
) -> Result<(), OfpBadActionCode> {
    for action in actions {
        match *action {
            Action::Output { port, .. } => validate_output(port, key, allow_table)?,
            Action::SetVlanVid(vid) if vid > packet::VLAN_VID_MASK => {
                return Err(OfpBadActionCode::BadArgument)
            }
            Action::SetVlanPcp(pcp) if pcp > 7 => return Err(OfpBadActionCode::BadArgument),
            Action::SetMplsLabel(label) => validate_mpls(label, 0)?,
            Action::SetMplsExp(exp) => validate_mpls(0, exp)?,
            Action::Vendor(VendorAction::Ericsson(ErAction::PushMpls { label, exp, .. })) => {
                validate_mpls(label, exp)?
            }
            _ => {}
        }
    }
    Ok(())
}

/// Checks the action list of a virtual port.
/// Outputs must leave the virtual port table: the chain itself is given by the parent port.
pub fn validate_vport_actions(actions: &[VPortAction]) -> Result<(), OfpBadActionCode> {
    for action in actions {
        match *action {
            VPortAction::Output { port, .. } => {
                if is_vport(port) {
                    return Err(OfpBadActionCode::BadOutPort);
                }
                validate_output(port, &MatchKey::all(), false)?
            }
            VPortAction::PushMpls { label, exp, .. } => validate_mpls(label, exp)?,
            VPortAction::SetMplsLabel(label) => validate_mpls(label, 0)?,
            VPortAction::SetMplsExp(exp) => validate_mpls(0, exp)?,
            VPortAction::PopMpls { .. } => {}
        }
    }
    Ok(())
}

/// Checks whether one of `actions` outputs to `port`. OFPP_NONE matches any list.
pub fn outputs_to(actions: &[Action], port: u32) -> bool {
    port == OFPP_NONE
        || actions.iter().any(|action| match *action {
            Action::Output { port: p, .. } => p == port,
            _ => false,
        })
}

/// Runs `actions` against `packet`, keeping `key` in sync with the rewritten headers
pub fn execute_actions<S: ActionSink + ?Sized>(
    sink: &mut S,
    packet: &mut Packet,
    key: &mut FlowKey,
    actions: &[Action],
    ignore_no_fwd: bool,
) {
    for action in actions {
        trace!("Executing {:?}", action);
        match *action {
            Action::Output { port, max_len } => {
                sink.output(packet, key, port, max_len, ignore_no_fwd)
            }
            Action::SetVlanVid(vid) => {
                packet.set_vlan_tci(vid, packet::VLAN_VID_MASK);
                key.dl_vlan = vid & packet::VLAN_VID_MASK;
            }
            Action::SetVlanPcp(pcp) => {
                let tci = u16::from(pcp) << packet::VLAN_PCP_SHIFT;
                packet.set_vlan_tci(tci, packet::VLAN_PCP_MASK);
                if key.dl_vlan == OFP_VLAN_NONE {
                    key.dl_vlan = 0;
                }
            }
            Action::StripVlan => {
                packet.strip_vlan();
                key.dl_vlan = OFP_VLAN_NONE;
            }
            Action::SetDlSrc(addr) => {
                packet.set_eth_src(addr);
                key.dl_src = addr;
            }
            Action::SetDlDst(addr) => {
                packet.set_eth_dst(addr);
                key.dl_dst = addr;
            }
            Action::SetNwSrc(addr) => {
                if packet.ipv4_src().is_some() {
                    packet.set_ipv4_src(addr);
                    key.nw_src = addr;
                }
            }
            Action::SetNwDst(addr) => {
                if packet.ipv4_dst().is_some() {
                    packet.set_ipv4_dst(addr);
                    key.nw_dst = addr;
                }
            }
            Action::SetTpSrc(port) => {
                if packet.set_tp_src(port) {
                    key.tp_src = port;
                }
            }
            Action::SetTpDst(port) => {
                if packet.set_tp_dst(port) {
                    key.tp_dst = port;
                }
            }
            Action::SetMplsLabel(label) => set_mpls_label(packet, key, label),
            Action::SetMplsExp(exp) => packet.set_mpls_exp(exp),
            Action::Vendor(VendorAction::Ericsson(ref er)) => execute_er_action(packet, key, er),
        }
    }
}

fn set_mpls_label(packet: &mut Packet, key: &mut FlowKey, label: u32) {
    if packet.mpls_shim().is_some() {
        packet.set_mpls_label(label);
        key.mpls_label1 = label;
    }
}

fn execute_er_action(packet: &mut Packet, key: &mut FlowKey, action: &ErAction) {
    match *action {
        ErAction::PushMpls { label, exp, ttl } => packet.push_mpls(label, exp, ttl),
        ErAction::PopMpls { eth_type } => packet.pop_mpls(eth_type),
    }
    // the stack changed, so every field below it may have become visible or hidden
    *key = FlowKey::extract(packet, key.in_port);
}

/// Runs the actions of one virtual port against `packet`
pub fn execute_vport_actions<S: ActionSink + ?Sized>(
    sink: &mut S,
    packet: &mut Packet,
    key: &mut FlowKey,
    actions: &[VPortAction],
    ignore_no_fwd: bool,
) {
    for action in actions {
        trace!("Executing virtual port action {:?}", action);
        match *action {
            VPortAction::Output { port, max_len } => {
                sink.output(packet, key, port, max_len, ignore_no_fwd)
            }
            VPortAction::PopMpls { eth_type } => {
                execute_er_action(packet, key, &ErAction::PopMpls { eth_type: eth_type })
            }
            VPortAction::PushMpls { label, exp, ttl } => execute_er_action(
                packet,
                key,
                &ErAction::PushMpls {
                    label: label,
                    exp: exp,
                    ttl: ttl,
                },
            ),
            VPortAction::SetMplsLabel(label) => set_mpls_label(packet, key, label),
            VPortAction::SetMplsExp(exp) => packet.set_mpls_exp(exp),
        }
    }
}
