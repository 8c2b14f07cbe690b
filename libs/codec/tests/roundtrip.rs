//! Write → parse → read round trips for every supported type tag.

use proptest::prelude::*;

use osc_codec::{parse_message, MessageScratch, OscWriter};
use osc_types::{Color32, MidiMessage, NtpTimestamp};

fn parse<'b>(buf: &'b [u8], scratch: &'b mut MessageScratch) -> osc_codec::MessageView<'b> {
    parse_message(buf, 0, buf.len(), scratch).expect("writer output must parse");
    scratch.view(buf)
}

proptest! {
    #[test]
    fn int32_round_trips(value in any::<i32>()) {
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",i");
        writer.write_int32(value);
        let mut scratch = MessageScratch::new();
        prop_assert_eq!(parse(writer.as_slice(), &mut scratch).read_int32(0), value);
    }

    #[test]
    fn float32_round_trips(value in any::<f32>()) {
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",f");
        writer.write_float32(value);
        let mut scratch = MessageScratch::new();
        let read = parse(writer.as_slice(), &mut scratch).read_float32(0);
        prop_assert_eq!(read.to_bits(), value.to_bits());
    }

    #[test]
    fn int64_round_trips(value in any::<i64>()) {
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",h");
        writer.write_int64(value);
        let mut scratch = MessageScratch::new();
        prop_assert_eq!(parse(writer.as_slice(), &mut scratch).read_int64(0), value);
    }

    #[test]
    fn float64_round_trips(value in any::<f64>()) {
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",d");
        writer.write_float64(value);
        let mut scratch = MessageScratch::new();
        let read = parse(writer.as_slice(), &mut scratch).read_float64(0);
        prop_assert_eq!(read.to_bits(), value.to_bits());
    }

    #[test]
    fn string_round_trips(value in "[a-zA-Z0-9/_.-]{0,48}") {
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",s");
        writer.write_str(&value);
        let mut scratch = MessageScratch::new();
        prop_assert_eq!(parse(writer.as_slice(), &mut scratch).read_str(0), value.as_str());
    }

    #[test]
    fn blob_round_trips(value in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",b");
        writer.write_blob(&value);
        let mut scratch = MessageScratch::new();
        prop_assert_eq!(parse(writer.as_slice(), &mut scratch).read_blob_slice(0), &value[..]);
    }

    #[test]
    fn color_round_trips(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), a in any::<u8>()) {
        let color = Color32::new(r, g, b, a);
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",r");
        writer.write_color(color);
        let mut scratch = MessageScratch::new();
        prop_assert_eq!(parse(writer.as_slice(), &mut scratch).read_color(0), color);
    }

    #[test]
    fn midi_round_trips(port in any::<u8>(), status in any::<u8>(), d1 in any::<u8>(), d2 in any::<u8>()) {
        let midi = MidiMessage::new(port, status, d1, d2);
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",m");
        writer.write_midi(midi);
        let mut scratch = MessageScratch::new();
        prop_assert_eq!(parse(writer.as_slice(), &mut scratch).read_midi(0), midi);
    }

    #[test]
    fn timestamp_round_trips(seconds in any::<u32>(), fraction in any::<u32>()) {
        let ts = NtpTimestamp::new(seconds, fraction);
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",t");
        writer.write_timestamp(ts);
        let mut scratch = MessageScratch::new();
        prop_assert_eq!(parse(writer.as_slice(), &mut scratch).read_timestamp(0), ts);
    }

    #[test]
    fn writer_length_is_always_aligned(
        text in "[a-z]{0,16}",
        blob in proptest::collection::vec(any::<u8>(), 0..32),
        int in any::<i32>(),
    ) {
        let mut writer = OscWriter::new();
        writer.begin_message("/rt", ",sbi");
        writer.write_str(&text);
        prop_assert_eq!(writer.len() % 4, 0);
        writer.write_blob(&blob);
        prop_assert_eq!(writer.len() % 4, 0);
        writer.write_int32(int);
        prop_assert_eq!(writer.len() % 4, 0);
    }
}

#[test]
fn booleans_round_trip_through_tags() {
    // T/F carry their value in the tag string itself
    let mut writer = OscWriter::new();
    writer.begin_message("/rt", ",TF");
    let mut scratch = MessageScratch::new();
    let buf = writer.as_slice().to_vec();
    parse_message(&buf, 0, buf.len(), &mut scratch).unwrap();
    let view = scratch.view(&buf);
    assert!(view.read_bool(0));
    assert!(!view.read_bool(1));
}

#[test]
fn ascii_char_round_trips() {
    let mut writer = OscWriter::new();
    writer.begin_message("/rt", ",c");
    writer.write_char('Q');
    let mut scratch = MessageScratch::new();
    let buf = writer.as_slice().to_vec();
    parse_message(&buf, 0, buf.len(), &mut scratch).unwrap();
    assert_eq!(scratch.view(&buf).read_char(0), 'Q');
}
