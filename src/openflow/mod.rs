/*!
The OpenFlow protocol spoken on the control channel

`messages` holds the message primitives together with their wire codec,
`error` the failure classes that are reported back to the controller.
*/

pub mod error;
pub mod messages;
