//! Shared helpers for driving a client against an in-memory transport.

#![allow(dead_code)]

use ril_client::{ClientConfig, RecordingTransport, RilClient};
use ril_wire::{FrameCodec, Message, ModemErrorCode, Request, SetupDataCallParams};

pub type TestClient = RilClient<RecordingTransport>;

pub fn client() -> TestClient {
    RilClient::new(ClientConfig::default(), RecordingTransport::new())
}

pub fn client_with(config: ClientConfig) -> TestClient {
    RilClient::new(config, RecordingTransport::new())
}

pub fn params() -> SetupDataCallParams {
    SetupDataCallParams {
        radio_technology: "1".to_string(),
        profile: "0".to_string(),
        apn: "internet".to_string(),
        user: String::new(),
        password: String::new(),
        auth_type: "0".to_string(),
        protocol: "IP".to_string(),
    }
}

/// Decode every frame the client has sent since the last call.
pub fn sent(client: &mut TestClient) -> Vec<(i32, Request)> {
    let mut codec = FrameCodec::new();
    for frame in client.transport_mut().take_frames() {
        codec.push(&frame);
    }
    let mut requests = Vec::new();
    while let Some(parcel) = codec.decode().expect("valid frame") {
        requests.push(Request::decode(&parcel).expect("valid request"));
    }
    requests
}

/// Feed a solicited response to the client.
pub fn respond(client: &mut TestClient, serial: i32, error: ModemErrorCode, payload: Vec<u8>) {
    let frame = Message::Solicited {
        serial,
        error,
        payload,
    }
    .encode_frame();
    client.feed(&frame).expect("feed");
}

/// Feed an unsolicited response to the client.
pub fn unsolicited(client: &mut TestClient, code: i32, payload: Vec<u8>) {
    let frame = Message::Unsolicited { code, payload }.encode_frame();
    client.feed(&frame).expect("feed");
}
