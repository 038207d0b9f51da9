/*!
Packets held back while the controller decides about them

Slots are handed out round robin. A buffer id carries the slot index in
its low bits and the slot's generation cookie in the high bits, so an id
whose slot has been recycled no longer resolves.
*/

use openflow::messages::OFP_NO_BUFFER;
use packet::Packet;

/// Number of packets the buffer holds
pub const N_PKT_BUFFERS: usize = 1 << PKT_BUFFER_BITS;
const PKT_BUFFER_BITS: u32 = 8;
const PKT_BUFFER_MASK: u32 = (1 << PKT_BUFFER_BITS) - 1;
const PKT_COOKIE_BITS: u32 = 32 - PKT_BUFFER_BITS;

/// A packet and the port it was received on
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedPacket {
    pub packet: Packet,
    pub in_port: u32,
}

#[derive(Debug, Default)]
struct Slot {
    packet: Option<BufferedPacket>,
    cookie: u32,
}

#[derive(Debug)]
pub struct PacketBuffer {
    slots: Vec<Slot>,
    next: usize,
}

impl PacketBuffer {
    pub fn new() -> PacketBuffer {
        PacketBuffer {
            slots: (0..N_PKT_BUFFERS).map(|_| Slot::default()).collect(),
            next: 0,
        }
    }

    /// Stores `packet` in the next slot, dropping the packet it held before.
    /// The returned id is never OFP_NO_BUFFER.
    pub fn save(&mut self, packet: Packet, in_port: u32) -> u32 {
        let idx = self.next;
        self.next = (self.next + 1) % N_PKT_BUFFERS;

        let slot = &mut self.slots[idx];
        if slot.packet.is_some() {
            debug!("Recycling packet buffer slot {}", idx);
        }
        slot.cookie += 1;
        // the all-ones cookie would make the id collide with OFP_NO_BUFFER
        if slot.cookie >= (1 << PKT_COOKIE_BITS) - 1 {
            slot.cookie = 0;
        }
        slot.packet = Some(BufferedPacket {
            packet: packet,
            in_port: in_port,
        });
        let id = (slot.cookie << PKT_BUFFER_BITS) | idx as u32;
        debug_assert!(id != OFP_NO_BUFFER);
        id
    }

    fn slot(&mut self, id: u32) -> Option<&mut Slot> {
        let slot = &mut self.slots[(id & PKT_BUFFER_MASK) as usize];
        if slot.cookie == id >> PKT_BUFFER_BITS {
            Some(slot)
        }
        else {
            None
        }
    }

    /// Takes the packet `id` refers to.
    /// Fails for ids whose slot was recycled or whose packet was already taken.
    pub fn retrieve(&mut self, id: u32) -> Option<BufferedPacket> {
        self.slot(id).and_then(|slot| slot.packet.take())
    }

    /// Drops the packet `id` refers to. Returns whether there was one.
    pub fn discard(&mut self, id: u32) -> bool {
        self.retrieve(id).is_some()
    }

    /// Number of packets that are currently held
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.packet.is_some()).count()
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        PacketBuffer::new()
    }
}
