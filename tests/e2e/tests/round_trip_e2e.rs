//! Full-stack round trips: every payload shape travels client -> UDP ->
//! server -> handler and reads back intact.

use osc_e2e_tests::{Loopback, RECEIVE_DEADLINE};
use osc_types::{Color32, MidiMessage, NtpTimestamp, TypeTag};

#[test]
fn float32_round_trip() {
    let mut fixture = Loopback::new().unwrap();
    let rx = fixture
        .capture("/composition/bpm", |view| {
            (view.element_count(), view.tag(0), view.read_float32(0))
        })
        .unwrap();

    fixture.client.send_float32("/composition/bpm", 128.0).unwrap();
    let (count, tag, value) = rx.recv_timeout(RECEIVE_DEADLINE).unwrap();
    assert_eq!(count, 1);
    assert_eq!(tag, Some(TypeTag::Float32));
    assert_eq!(value, 128.0);
}

#[test]
fn int32_and_int64_round_trip() {
    let mut fixture = Loopback::new().unwrap();
    let ints = fixture.capture("/i", |view| view.read_int32(0)).unwrap();
    let longs = fixture.capture("/h", |view| view.read_int64(0)).unwrap();

    fixture.client.send_int32("/i", -40_000).unwrap();
    fixture.client.send_int64("/h", i64::MIN + 7).unwrap();
    assert_eq!(ints.recv_timeout(RECEIVE_DEADLINE).unwrap(), -40_000);
    assert_eq!(longs.recv_timeout(RECEIVE_DEADLINE).unwrap(), i64::MIN + 7);
}

#[test]
fn float64_round_trip() {
    let mut fixture = Loopback::new().unwrap();
    let rx = fixture.capture("/d", |view| view.read_float64(0)).unwrap();
    fixture.client.send_float64("/d", std::f64::consts::PI).unwrap();
    assert_eq!(rx.recv_timeout(RECEIVE_DEADLINE).unwrap(), std::f64::consts::PI);
}

#[test]
fn string_and_blob_round_trip() {
    let mut fixture = Loopback::new().unwrap();
    let strings = fixture.capture("/s", |view| view.read_str(0).to_owned()).unwrap();
    let blobs = fixture
        .capture("/b", |view| view.read_blob_slice(0).to_vec())
        .unwrap();

    fixture.client.send_string("/s", "clip/preview").unwrap();
    fixture.client.send_blob("/b", &[9, 8, 7, 6, 5]).unwrap();
    assert_eq!(strings.recv_timeout(RECEIVE_DEADLINE).unwrap(), "clip/preview");
    assert_eq!(blobs.recv_timeout(RECEIVE_DEADLINE).unwrap(), vec![9, 8, 7, 6, 5]);
}

#[test]
fn tag_only_values_round_trip() {
    let mut fixture = Loopback::new().unwrap();
    let bools = fixture.capture("/t", |view| (view.tag(0), view.read_bool(0))).unwrap();

    fixture.client.send_bool("/t", true).unwrap();
    fixture.client.send_bool("/t", false).unwrap();
    fixture.client.send_nil("/t").unwrap();
    fixture.client.send_infinitum("/t").unwrap();

    assert_eq!(bools.recv_timeout(RECEIVE_DEADLINE).unwrap(), (Some(TypeTag::True), true));
    assert_eq!(bools.recv_timeout(RECEIVE_DEADLINE).unwrap(), (Some(TypeTag::False), false));
    assert_eq!(bools.recv_timeout(RECEIVE_DEADLINE).unwrap(), (Some(TypeTag::Nil), false));
    assert_eq!(
        bools.recv_timeout(RECEIVE_DEADLINE).unwrap(),
        (Some(TypeTag::Infinitum), false)
    );
}

#[test]
fn struct_payloads_round_trip() {
    let mut fixture = Loopback::new().unwrap();
    let colors = fixture.capture("/r", |view| view.read_color(0)).unwrap();
    let midi = fixture.capture("/m", |view| view.read_midi(0)).unwrap();
    let times = fixture.capture("/ts", |view| view.read_timestamp(0)).unwrap();
    let chars = fixture.capture("/c", |view| view.read_char(0)).unwrap();

    let color = Color32::new(255, 128, 0, 64);
    let note = MidiMessage::new(0, 0x90, 64, 100);
    let stamp = NtpTimestamp::new(3_900_000_000, 0x8000_0000);

    fixture.client.send_color("/r", color).unwrap();
    fixture.client.send_midi("/m", note).unwrap();
    fixture.client.send_timestamp("/ts", stamp).unwrap();
    fixture.client.send_char("/c", '7').unwrap();

    assert_eq!(colors.recv_timeout(RECEIVE_DEADLINE).unwrap(), color);
    assert_eq!(midi.recv_timeout(RECEIVE_DEADLINE).unwrap(), note);
    assert_eq!(times.recv_timeout(RECEIVE_DEADLINE).unwrap(), stamp);
    assert_eq!(chars.recv_timeout(RECEIVE_DEADLINE).unwrap(), '7');
}

#[test]
fn multi_element_message_round_trip() {
    let mut fixture = Loopback::new().unwrap();
    let rx = fixture
        .capture("/v", |view| {
            (view.read_float32(0), view.read_float32(1), view.read_float32(2))
        })
        .unwrap();

    fixture.client.send_float32s("/v", &[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(rx.recv_timeout(RECEIVE_DEADLINE).unwrap(), (1.0, 2.0, 3.0));
}

#[test]
fn pattern_handler_catches_concrete_addresses() {
    let mut fixture = Loopback::new().unwrap();
    let rx = fixture.capture("/layer/*/volume", |view| view.read_float32(0)).unwrap();

    fixture.client.send_float32("/layer/3/volume", 0.8).unwrap();
    fixture.client.send_float32("/layer/9/volume", 0.2).unwrap();
    assert_eq!(rx.recv_timeout(RECEIVE_DEADLINE).unwrap(), 0.8);
    assert_eq!(rx.recv_timeout(RECEIVE_DEADLINE).unwrap(), 0.2);
}

#[test]
fn hand_composed_message_round_trip() {
    let mut fixture = Loopback::new().unwrap();
    let rx = fixture
        .capture("/mixed", |view| {
            (view.read_int32(0), view.read_str(1).to_owned(), view.read_float32(2))
        })
        .unwrap();

    let writer = fixture.client.writer();
    writer.begin_message("/mixed", ",isf");
    writer.write_int32(11);
    writer.write_str("fade");
    writer.write_float32(0.25);
    fixture.client.send_written().unwrap();

    assert_eq!(rx.recv_timeout(RECEIVE_DEADLINE).unwrap(), (11, "fade".to_owned(), 0.25));
}
