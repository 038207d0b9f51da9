/*!
Controllers a simulated switch talks to

A controller sees every message a switch sends, as it would appear on the
wire. Its answers are returned as serialized messages and are fed back into
the switch's control input.
*/

use action::Action;
use flow::{FlowKey, MatchKey};
use openflow::error::{Error, Result};
use openflow::messages::deserialize::Deserialize;
use openflow::messages::serialize::OfpPacket;
use openflow::messages::*;
use packet::{MacAddr, Packet};

use rand;

use std::collections::{BTreeMap, BTreeSet};

pub fn gen_xid() -> u32 {
    let xid = rand::random();
    trace!("Using xid {} for the outgoing message", xid);
    xid
}

/// The controller side of a switch connection
pub trait Controller {
    /// Registers a switch. Messages of unregistered switches are ignored.
    fn add_switch(&mut self, datapath_id: u64);

    /// Handles one message from the switch and returns the messages to send back
    fn receive_from_switch(&mut self, datapath_id: u64, msg: &[u8]) -> Vec<Vec<u8>>;
}

fn serialize<P: OfpPacket>(packet: &P) -> Result<Vec<u8>> {
    let mut msg = vec![];
    packet.serialize(&mut msg, gen_xid())?;
    Ok(msg)
}

/// Returns the Packet-In `msg` carries. Other messages are only logged.
fn packet_in(msg: &[u8]) -> Result<Option<OfpPacketIn>> {
    let header = OfpHeader::from_message(msg)?;
    debug!("Incoming message: {:?}", header);
    let body = &msg[OfpHeader::header_length()..];
    let t = header.typ;
    if t == OfpType::PacketIn as u8 {
        return Ok(Some(OfpPacketIn::deserialize(body)?));
    }
    else if t == OfpType::Error as u8 {
        let error = OfpErrorMsg::deserialize(body)?;
        error!("Unexpected {}", error);
        debug!("Full error message: {:?}", error);
    }
    else if t == OfpType::FlowExpired as u8 {
        let expired = OfpFlowExpired::deserialize(body)?;
        info!(
            "Flow expired after {}s with {} packets",
            expired.duration, expired.packet_count
        );
    }
    else {
        trace!("Ignoring message of type {}", t);
    }
    Ok(None)
}

/// The key of the frame a Packet-In carries
fn packet_in_key(packet_in: &OfpPacketIn) -> Option<FlowKey> {
    Packet::parse(packet_in.data.clone()).map(|packet| FlowKey::extract(&packet, packet_in.in_port))
}

/// Installs a flow dropping every packet the switch does not know about
#[derive(Debug, Default)]
pub struct DropController {
    switches: BTreeSet<u64>,
}

impl DropController {
    pub fn new() -> DropController {
        DropController::default()
    }

    fn handle_ofp_message(&mut self, msg: &[u8]) -> Result<Vec<Vec<u8>>> {
        let packet_in = match packet_in(msg)? {
            Some(packet_in) => packet_in,
            None => return Ok(vec![]),
        };
        let key = match packet_in_key(&packet_in) {
            Some(key) => key,
            None => {
                warn!("Packet-In carries no parsable frame");
                return Ok(vec![]);
            }
        };
        let mut flow_mod = OfpFlowMod::new(
            OfpFlowModCommand::Add,
            MatchKey::exact(key),
            OFP_DEFAULT_PRIORITY,
            vec![],
        );
        flow_mod.buffer_id = packet_in.buffer_id;
        Ok(vec![serialize(&flow_mod)?])
    }
}

impl Controller for DropController {
    fn add_switch(&mut self, datapath_id: u64) {
        if !self.switches.insert(datapath_id) {
            warn!("Switch {:#x} is already registered", datapath_id);
        }
    }

    fn receive_from_switch(&mut self, datapath_id: u64, msg: &[u8]) -> Vec<Vec<u8>> {
        if !self.switches.contains(&datapath_id) {
            error!("Can't receive from switch {:#x}, it is not registered", datapath_id);
            return vec![];
        }
        self.handle_ofp_message(msg).unwrap_or_else(|e| {
            error!("Could not handle message of switch {:#x}: {}", datapath_id, e);
            vec![]
        })
    }
}

/// An Ethernet learning switch.
/// Remembers the port each source address was seen on, and installs flows
/// that forward to the learned port or flood.
#[derive(Debug, Default)]
pub struct LearningController {
    expiration_secs: u16,
    learned: BTreeMap<u64, BTreeMap<MacAddr, u32>>,
}

impl LearningController {
    /// `expiration_secs` is the hard timeout of installed flows, 0 makes them permanent
    pub fn new(expiration_secs: u16) -> LearningController {
        LearningController {
            expiration_secs: expiration_secs,
            learned: BTreeMap::new(),
        }
    }

    /// The port `addr` was learned on at switch `datapath_id`
    pub fn learned_port(&self, datapath_id: u64, addr: &MacAddr) -> Option<u32> {
        self.learned
            .get(&datapath_id)
            .and_then(|table| table.get(addr))
            .cloned()
    }

    fn flow_mod(&self, command: OfpFlowModCommand, key: FlowKey, buffer_id: u32, out_port: u32) -> OfpFlowMod {
        let mut flow_mod = OfpFlowMod::new(
            command,
            MatchKey::exact(key),
            OFP_DEFAULT_PRIORITY,
            vec![Action::Output {
                port: out_port,
                max_len: 0,
            }],
        );
        flow_mod.buffer_id = buffer_id;
        flow_mod.hard_timeout = self.expiration_secs;
        flow_mod
    }

    fn handle_ofp_message(&mut self, datapath_id: u64, msg: &[u8]) -> Result<Vec<Vec<u8>>> {
        let packet_in = match packet_in(msg)? {
            Some(packet_in) => packet_in,
            None => return Ok(vec![]),
        };
        let key = packet_in_key(&packet_in).ok_or(Error::BadRequest(OfpBadRequestCode::BadLen))?;
        let table = self.learned.entry(datapath_id).or_insert_with(BTreeMap::new);

        let out_port = if key.dl_dst.is_broadcast() {
            debug!("Setting to flood, {} is broadcast", key.dl_dst);
            OFPP_FLOOD
        }
        else if let Some(&port) = table.get(&key.dl_dst) {
            port
        }
        else {
            debug!("Setting to flood, don't know yet what port {} is connected to", key.dl_dst);
            OFPP_FLOOD
        };

        let mut replies = vec![];
        let learn = !table.contains_key(&key.dl_src);
        if learn {
            info!("Learned that {} can be found over port {}", key.dl_src, key.in_port);
            table.insert(key.dl_src, key.in_port);
        }

        let forward = self.flow_mod(OfpFlowModCommand::Add, key, packet_in.buffer_id, out_port);
        replies.push(serialize(&forward)?);

        if learn {
            // the reverse direction now goes to the port the source was seen on
            let reverse_key = FlowKey {
                in_port: out_port,
                dl_src: key.dl_dst,
                dl_dst: key.dl_src,
                ..key
            };
            let reverse = self.flow_mod(OfpFlowModCommand::Modify, reverse_key, OFP_NO_BUFFER, key.in_port);
            replies.push(serialize(&reverse)?);
        }
        Ok(replies)
    }
}

impl Controller for LearningController {
    fn add_switch(&mut self, datapath_id: u64) {
        if self.learned.insert(datapath_id, BTreeMap::new()).is_some() {
            warn!("Switch {:#x} is already registered", datapath_id);
        }
    }

    fn receive_from_switch(&mut self, datapath_id: u64, msg: &[u8]) -> Vec<Vec<u8>> {
        if !self.learned.contains_key(&datapath_id) {
            error!("Can't receive from switch {:#x}, it is not registered", datapath_id);
            return vec![];
        }
        self.handle_ofp_message(datapath_id, msg).unwrap_or_else(|e| {
            error!("Could not handle message of switch {:#x}: {}", datapath_id, e);
            vec![]
        })
    }
}
