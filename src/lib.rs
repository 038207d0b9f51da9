/*!
An OpenFlow software switch datapath for discrete-event network simulation.

A `datapath::SwitchDatapath` receives frames on its attached ports, matches
them against a two-level flow table after a modeled lookup delay and runs
the matched actions. Misses are buffered and reported to a
`controller::Controller`, whose Flow-Mod and Packet-Out answers are fed
back into the switch. Time only advances through a `sim::Scheduler`.
*/

extern crate byteorder;
extern crate ini;
extern crate ipnetwork;
#[macro_use]
extern crate log;
extern crate rand;

pub mod action;
pub mod buffer;
pub mod checksum;
pub mod conf;
pub mod controller;
pub mod datapath;
pub mod flow;
pub mod flow_table;
pub mod openflow;
pub mod packet;
pub mod port;
pub mod sim;
pub mod stats;
pub mod vport;
