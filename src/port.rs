/*!
The ports of a switch and the network devices behind them
*/

use openflow::error::{Error, Result};
use openflow::messages::*;
use packet::{MacAddr, Packet, ETH_HEADER_LEN};

/// Default number of ports a switch can attach
pub const MAX_PORTS: usize = 255;

/// The network device a port transmits on
pub trait NetDevice {
    /// Hands a complete frame to the device. Returns false if the device refused it.
    fn send(&mut self, frame: Vec<u8>, src: MacAddr, dst: MacAddr, protocol: u16) -> bool;

    fn is_link_up(&self) -> bool;

    fn address(&self) -> MacAddr;

    /// Largest payload the device carries behind the Ethernet header
    fn mtu(&self) -> u16;
}

/// An attached port with its configuration and counters
pub struct Port {
    pub port_no: u32,
    /// Bitmap of OFPPC_* flags
    pub config: u32,
    /// Bitmap of OFPPS_* flags
    pub state: u32,
    device: Box<dyn NetDevice>,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub tx_dropped: u64,
    pub mpls_ttl0_dropped: u64,
}

impl Port {
    fn new(port_no: u32, device: Box<dyn NetDevice>) -> Port {
        Port {
            port_no: port_no,
            config: 0,
            state: 0,
            device: device,
            rx_packets: 0,
            tx_packets: 0,
            rx_bytes: 0,
            tx_bytes: 0,
            tx_dropped: 0,
            mpls_ttl0_dropped: 0,
        }
    }

    pub fn address(&self) -> MacAddr {
        self.device.address()
    }

    pub fn is_link_up(&self) -> bool {
        self.device.is_link_up()
    }

    pub fn name(&self) -> String {
        format!("eth{}", self.port_no)
    }

    /// Accounts a received frame of `bytes`
    pub fn received(&mut self, bytes: usize) {
        self.rx_packets += 1;
        self.rx_bytes += bytes as u64;
    }

    /// Sends `packet` on the device.
    /// Frames that are administratively blocked, too large or refused by the device count as dropped.
    pub fn transmit(&mut self, packet: Packet, ignore_no_fwd: bool) -> bool {
        let len = packet.len();
        if self.config & OFPPC_PORT_DOWN != 0
            || (!ignore_no_fwd && self.config & OFPPC_NO_FWD != 0)
            || self.state & OFPPS_LINK_DOWN != 0
        {
            trace!("Port {} is blocked, dropping frame", self.port_no);
            self.tx_dropped += 1;
            return false;
        }
        if len - ETH_HEADER_LEN > usize::from(self.device.mtu()) {
            warn!(
                "Dropping frame of {} bytes on port {} exceeding the MTU of {}",
                len,
                self.port_no,
                self.device.mtu()
            );
            self.tx_dropped += 1;
            return false;
        }
        let src = packet.eth_src();
        let dst = packet.eth_dst();
        let protocol = packet.outer_type();
        if self.device.send(packet.into_data(), src, dst, protocol) {
            self.tx_packets += 1;
            self.tx_bytes += len as u64;
            true
        }
        else {
            self.tx_dropped += 1;
            false
        }
    }

    pub fn desc(&self) -> OfpPhyPort {
        OfpPhyPort {
            port_no: self.port_no,
            hw_addr: self.address(),
            name: self.name(),
            config: self.config,
            state: self.state,
            curr: 0,
            advertised: 0,
            supported: 0,
            peer: 0,
        }
    }

    pub fn stats(&self) -> OfpPortStats {
        OfpPortStats {
            rx_packets: self.rx_packets,
            tx_packets: self.tx_packets,
            rx_bytes: self.rx_bytes,
            tx_bytes: self.tx_bytes,
            tx_dropped: self.tx_dropped,
            mpls_ttl0_dropped: self.mpls_ttl0_dropped,
            ..OfpPortStats::unknown(self.port_no)
        }
    }

    /// Mirrors the device into the port. Returns whether config or state changed.
    fn poll(&mut self) -> bool {
        let (config, state) = (self.config, self.state);
        // a simulated device is always enabled
        self.config &= !OFPPC_PORT_DOWN;
        if self.device.is_link_up() {
            self.state &= !OFPPS_LINK_DOWN;
        }
        else {
            self.state |= OFPPS_LINK_DOWN;
        }
        config != self.config || state != self.state
    }
}

/// The attached ports of a switch. Port numbers are the attach order.
pub struct PortManager {
    max_ports: usize,
    ports: Vec<Port>,
}

impl PortManager {
    pub fn new(max_ports: usize) -> PortManager {
        PortManager {
            max_ports: max_ports.min(OFPP_MAX as usize),
            ports: vec![],
        }
    }

    /// Attaches a device and returns its port number
    pub fn attach(&mut self, device: Box<dyn NetDevice>) -> Result<u32> {
        if self.ports.len() >= self.max_ports {
            return Err(Error::PortTableFull);
        }
        let port_no = self.ports.len() as u32;
        self.ports.push(Port::new(port_no, device));
        Ok(port_no)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn get(&self, port_no: u32) -> Option<&Port> {
        self.ports.get(port_no as usize)
    }

    pub fn get_mut(&mut self, port_no: u32) -> Option<&mut Port> {
        self.ports.get_mut(port_no as usize)
    }

    pub fn iter(&self) -> ::std::slice::Iter<Port> {
        self.ports.iter()
    }

    /// Updates every port from its device and returns the numbers of the changed ones
    pub fn poll_and_diff(&mut self) -> Vec<u32> {
        self.ports
            .iter_mut()
            .filter_map(|port| if port.poll() { Some(port.port_no) } else { None })
            .collect()
    }

    /// Applies the masked configuration bits of a Port-Mod request.
    /// A request carrying another hardware address than the port is ignored.
    pub fn apply_port_mod(&mut self, port_mod: &OfpPortMod) -> Result<()> {
        let port = self
            .ports
            .get_mut(port_mod.port_no as usize)
            .ok_or(Error::PortModFailed(OfpPortModFailedCode::BadPort))?;
        if port.address() != port_mod.hw_addr {
            debug!(
                "Ignoring Port-Mod for port {} with stale address {}",
                port.port_no, port_mod.hw_addr
            );
            return Ok(());
        }
        let mask = port_mod.mask & OFPPC_ALL;
        port.config = (port.config & !mask) | (port_mod.config & mask);
        debug!("Port {} config is now {:#x}", port.port_no, port.config);
        Ok(())
    }

    pub fn descs(&self) -> Vec<OfpPhyPort> {
        self.ports.iter().map(Port::desc).collect()
    }
}
