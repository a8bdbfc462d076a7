//! Integration tests for the hwfly-nx dissector
//!
//! These tests drive a full decoder session with captures produced by the
//! simulated FPGA and verify:
//! - Classification of every command family, including malformed ones
//! - Merging of repeated status polls and the events that end a run
//! - Compact and split layouts
//! - Option handling and wiring errors

use hwfly_decoder::{ChannelConfig, ChannelError, Decoder, DecoderOptions, FramingEvent};
use hwfly_protocol::{
    ActiveBuffer, Annotation, AnnotationClass, Command, ConfigCommand, ControlAction, FpgaId,
    Layout, StatusFlags, StatusRead, Transaction,
};
use hwfly_sim::{CaptureBuilder, SimulatedFpga};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Route decoder logs through the test harness; `RUST_LOG` picks the level
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Decode a whole capture and return everything it produced
    pub fn decode_all(options: DecoderOptions, capture: &[Transaction]) -> Vec<Annotation> {
        init_tracing();
        let mut decoder = Decoder::with_options(options);
        for txn in capture {
            decoder.process(txn);
        }
        decoder.finish();
        decoder.into_sink()
    }

    /// A single raw transaction laid out with default timing
    pub fn raw(mosi: &[u8], miso: &[u8]) -> Transaction {
        let mut capture = CaptureBuilder::default();
        capture.push_raw(mosi, miso);
        capture
            .into_transactions()
            .pop()
            .expect("both lines carry bytes")
    }

    pub fn split() -> DecoderOptions {
        DecoderOptions {
            layout: Layout::Split,
            ..Default::default()
        }
    }

    pub fn no_merge() -> DecoderOptions {
        DecoderOptions {
            merge_polls: false,
            ..Default::default()
        }
    }

    pub fn flags_poll() -> Command {
        Command::Status(StatusRead::Flags(StatusFlags::empty()))
    }

    pub fn timer_poll() -> Command {
        Command::Status(StatusRead::GlitchTimer(0))
    }

    pub fn labels(annotation: &Annotation) -> Vec<&str> {
        annotation.labels.iter().map(String::as_str).collect()
    }
}

use helpers::*;

// ============================================================================
// Configuration Command Tests
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_every_config_command_is_one_write() {
        let commands = [
            ConfigCommand::SetGlitchOffset(1000),
            ConfigCommand::SetGlitchWidth(12),
            ConfigCommand::SetGlitchTimeout(200),
            ConfigCommand::SelectBuffer(ActiveBuffer::Data),
            ConfigCommand::Control(ControlAction::StartGlitching),
            ConfigCommand::SetSubcycleDelay(3),
        ];
        let mut fpga = SimulatedFpga::default();
        for cmd in commands {
            let mut capture = CaptureBuilder::default();
            capture.exchange(&mut fpga, &Command::Config(cmd));
            let out = decode_all(DecoderOptions::default(), capture.transactions());
            assert_eq!(out.len(), 1, "{:?}", cmd);
            assert_eq!(out[0].class, AnnotationClass::Write, "{:?}", cmd);
        }
    }

    #[test]
    fn test_config_labels() {
        let out = decode_all(
            DecoderOptions::default(),
            &[
                raw(&[0x24, 0x01, 0xE8, 0x03], &[0; 4]),
                raw(&[0x24, 0x05, 0x02], &[0; 3]),
                raw(&[0x24, 0x06, 0x40], &[0; 3]),
            ],
        );
        assert_eq!(labels(&out[0]), ["Set glitch offset: 1000", "GO:1000"]);
        assert_eq!(
            labels(&out[1]),
            ["Select active buffer: RESP (data device->host)", "SB:rsp"]
        );
        assert_eq!(
            labels(&out[2]),
            ["Reset device (cmd stuck)", "Reset+CmdStuck", "Rst+CS"]
        );
    }

    #[test]
    fn test_glitch_offset_span_covers_both_value_bytes() {
        let txn = raw(&[0x24, 0x01, 0xE8, 0x03, 0xAA], &[0; 5]);
        let out = decode_all(DecoderOptions::default(), std::slice::from_ref(&txn));
        assert_eq!(out[0].span.start, txn.mosi()[0].start);
        assert_eq!(out[0].span.end, txn.mosi()[3].end);
    }

    #[test]
    fn test_unlisted_sub_commands_are_garbage() {
        for sub in [0x00, 0x04, 0x07, 0x09, 0xFF] {
            let out = decode_all(DecoderOptions::default(), &[raw(&[0x24, sub, 0x00], &[0; 3])]);
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].class, AnnotationClass::Garbage);
            assert_eq!(labels(&out[0]), ["Unrecognized 0x24 command", "??? 24"]);
        }
    }

    #[test]
    fn test_unknown_control_action() {
        let out = decode_all(DecoderOptions::default(), &[raw(&[0x24, 0x06, 0x02], &[0; 3])]);
        assert_eq!(out[0].class, AnnotationClass::Garbage);
        assert_eq!(
            labels(&out[0]),
            ["Unrecognized 0x24 0x6 command", "??? 24 06"]
        );
    }

    #[test]
    fn test_truncated_glitch_offset() {
        let out = decode_all(DecoderOptions::default(), &[raw(&[0x24, 0x01, 0xE8], &[0; 3])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class, AnnotationClass::Garbage);
        assert_eq!(
            labels(&out[0]),
            ["Invalid set_glitch_offset (too short?)", "GO:?"]
        );
    }

    #[test]
    fn test_too_short_families() {
        for mosi in [&[0x24][..], &[0x24, 0x02], &[0x26, 0x0B]] {
            let out = decode_all(DecoderOptions::default(), &[raw(mosi, &vec![0; mosi.len()])]);
            assert_eq!(out[0].class, AnnotationClass::Garbage);
            assert_eq!(labels(&out[0]), ["Unrecognized (too short?)", "???"]);
        }
    }

    #[test]
    fn test_unknown_opcode() {
        let txn = raw(&[0x99, 0x01, 0x02], &[0; 3]);
        let out = decode_all(DecoderOptions::default(), std::slice::from_ref(&txn));
        assert_eq!(out[0].class, AnnotationClass::Garbage);
        assert_eq!(out[0].label(), "Unrecognized command");
        assert_eq!(out[0].span, txn.span());
    }
}

// ============================================================================
// Status Poll Tests
// ============================================================================

mod poll_tests {
    use super::*;

    #[test]
    fn test_identical_polls_merge_into_one() {
        let mut fpga = SimulatedFpga::default();
        fpga.glitch_succeeded(5);
        let mut capture = CaptureBuilder::default();
        capture.poll(&mut fpga, &flags_poll(), 10);

        let txns = capture.transactions();
        let out = decode_all(DecoderOptions::default(), txns);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class, AnnotationClass::Read);
        assert_eq!(
            labels(&out[0]),
            ["Flags: GLITCH_SUCCESS, GLITCH_DT_CAPTURED", "F:g+,dc"]
        );
        assert_eq!(out[0].span.start, txns[0].mosi()[0].start);
        assert_eq!(out[0].span.end, txns[9].miso()[2].end);
    }

    #[test]
    fn test_merging_disabled_emits_every_poll() {
        let mut fpga = SimulatedFpga::default();
        let mut capture = CaptureBuilder::default();
        capture.poll(&mut fpga, &timer_poll(), 7);

        let out = decode_all(no_merge(), capture.transactions());
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|a| a.label() == "Glitch timer: 0"));
    }

    #[test]
    fn test_flag_extremes() {
        let out = decode_all(
            no_merge(),
            &[
                raw(&[0x26, 0x0B, 0x00], &[0x00, 0x00, 0x00]),
                raw(&[0x26, 0x0B, 0x00], &[0x00, 0x00, 0xFF]),
            ],
        );
        assert_eq!(labels(&out[0]), ["Flags: NONE", "F:_"]);
        assert_eq!(
            out[1].label(),
            "Flags: BUSY_SENDING, GLITCH_SUCCESS, GLITCH_TIMEOUT, UNKNOWN1, \
             LOADER_DATA_RCVD, UNKNOWN2, GLITCH_DT_CAPTURED, UNKNOWN3"
        );
        assert_eq!(out[1].labels[1], "F:bs,g+,g-,u1,ld,u2,dc,u3");
    }

    #[test]
    fn test_interleaved_polls_combine() {
        let mut fpga = SimulatedFpga::default();
        fpga.glitch_succeeded(42);
        let mut capture = CaptureBuilder::default();
        for _ in 0..4 {
            capture.exchange(&mut fpga, &flags_poll());
            capture.exchange(&mut fpga, &timer_poll());
        }

        let out = decode_all(DecoderOptions::default(), capture.transactions());
        assert_eq!(out.len(), 1);
        assert_eq!(
            labels(&out[0]),
            [
                "Flags: GLITCH_SUCCESS, GLITCH_DT_CAPTURED, Glitch timer: 42",
                "F:g+,dc,T:42"
            ]
        );
    }

    #[test]
    fn test_changed_reading_ends_run() {
        let mut fpga = SimulatedFpga::default();
        let mut capture = CaptureBuilder::default();
        fpga.respond(&[0x24, 0x06, 0x10]);
        capture.poll(&mut fpga, &timer_poll(), 3);
        fpga.tick();
        capture.poll(&mut fpga, &timer_poll(), 2);

        let out = decode_all(DecoderOptions::default(), capture.transactions());
        let values: Vec<_> = out.iter().map(|a| a.label()).collect();
        assert_eq!(values, ["Glitch timer: 0", "Glitch timer: 1"]);
        assert!(out[0].span.end <= out[1].span.start);
    }

    #[test]
    fn test_other_command_flushes_before_itself() {
        let mut fpga = SimulatedFpga::default();
        let mut capture = CaptureBuilder::default();
        capture.poll(&mut fpga, &flags_poll(), 3);
        capture.exchange(&mut fpga, &Command::DoEmmc);
        capture.poll(&mut fpga, &flags_poll(), 2);

        let out = decode_all(DecoderOptions::default(), capture.transactions());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].label(), "Flags: NONE");
        assert_eq!(labels(&out[1]), ["Do eMMC command", "MMC|>"]);
        assert_eq!(out[2].label(), "Flags: BUSY_SENDING");
    }

    #[test]
    fn test_garbage_flushes_pending_run() {
        let out = decode_all(
            DecoderOptions::default(),
            &[
                raw(&[0x26, 0x0A, 0x00], &[0, 0, 9]),
                raw(&[0x26, 0x0C, 0x00], &[0, 0, 9]),
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label(), "Glitch timer: 9");
        assert_eq!(labels(&out[1]), ["Unrecognized 0x26 command", "??? 26"]);
    }

    #[test]
    fn test_short_status_read_flushes_pending_run() {
        let out = decode_all(
            DecoderOptions::default(),
            &[
                raw(&[0x26, 0x0A, 0x00], &[0, 0, 6]),
                raw(&[0x26, 0x0B], &[0, 0]),
            ],
        );
        let got: Vec<_> = out.iter().map(|a| a.label()).collect();
        assert_eq!(got, ["Glitch timer: 6", "Unrecognized (too short?)"]);
        assert_eq!(out[1].class, AnnotationClass::Garbage);
    }

    #[test]
    fn test_finish_flushes_and_is_idempotent() {
        let mut decoder = Decoder::new();
        decoder.process(&raw(&[0x26, 0x0B, 0x00], &[0, 0, 0x10]));
        assert!(decoder.sink().is_empty());

        decoder.finish();
        decoder.finish();
        assert_eq!(decoder.sink().len(), 1);
        assert_eq!(decoder.sink()[0].label(), "Flags: LOADER_DATA_RCVD");
    }
}

// ============================================================================
// Read Command Tests
// ============================================================================

mod read_tests {
    use super::*;

    fn read_id(len: usize) -> Vec<Annotation> {
        let mut fpga = SimulatedFpga::default();
        let mut capture = CaptureBuilder::default();
        let id = FpgaId::Raw(vec![0; len - 1]);
        capture.exchange(&mut fpga, &Command::ReadFpgaId(id));
        decode_all(DecoderOptions::default(), capture.transactions())
    }

    #[test]
    fn test_fpga_id_ascii() {
        let out = read_id(5);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class, AnnotationClass::Read);
        assert_eq!(labels(&out[0]), ["FPGA Id: NXF2", "ID:NXF2", "Id"]);
    }

    #[test]
    fn test_fpga_id_wrong_length_is_hex() {
        assert_eq!(read_id(4)[0].label(), "FPGA Id: 4E 58 46");
        assert_eq!(read_id(6)[0].label(), "FPGA Id: 4E 58 46 32 00");
    }

    #[test]
    fn test_read_buffer_compact() {
        let mut fpga = SimulatedFpga::default();
        fpga.load_buffer(ActiveBuffer::Cmd, &[0x40, 0x00, 0x95]);
        let mut capture = CaptureBuilder::default();
        capture.exchange(&mut fpga, &Command::ReadBuffer { data: vec![0; 3] });

        let txns = capture.transactions();
        let out = decode_all(DecoderOptions::default(), txns);
        assert_eq!(labels(&out[0]), ["Read buffer: 40 00 95", "RdBuf"]);
        assert_eq!(out[0].span, txns[0].span());
    }

    #[test]
    fn test_write_buffer_compact() {
        let out = decode_all(
            DecoderOptions::default(),
            &[raw(&[0xBC, 0x01, 0xAB], &[0; 3])],
        );
        assert_eq!(out[0].class, AnnotationClass::Write);
        assert_eq!(labels(&out[0]), ["Write buffer: 01 AB", "WrBuf"]);
    }
}

// ============================================================================
// Split Layout Tests
// ============================================================================

mod split_layout_tests {
    use super::*;

    #[test]
    fn test_config_command_and_payload() {
        let txn = raw(&[0x24, 0x02, 0x0C], &[0; 3]);
        let out = decode_all(split(), std::slice::from_ref(&txn));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].class, AnnotationClass::Write);
        assert_eq!(labels(&out[0]), ["Set glitch width", "GW"]);
        assert_eq!(out[0].span.end, txn.mosi()[1].end);
        assert_eq!(out[1].class, AnnotationClass::Payload);
        assert_eq!(labels(&out[1]), ["12", "12"]);
        assert_eq!(out[1].span, txn.mosi()[2].span());
    }

    #[test]
    fn test_control_action_stays_single() {
        let out = decode_all(split(), &[raw(&[0x24, 0x06, 0x00], &[0; 3])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label(), "Stop glitching");
    }

    #[test]
    fn test_read_and_response() {
        let mut fpga = SimulatedFpga::default();
        let mut capture = CaptureBuilder::default();
        capture.exchange(&mut fpga, &Command::ReadFpgaId(FpgaId::Ascii([0; 4])));

        let txns = capture.transactions();
        let out = decode_all(split(), txns);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].class, AnnotationClass::Read);
        assert_eq!(labels(&out[0]), ["Read FPGA Id", "RdId", "Id"]);
        assert_eq!(out[1].class, AnnotationClass::Response);
        assert_eq!(out[1].label(), "NXF2");
        assert_eq!(out[1].span.start, txns[0].miso()[1].start);
    }

    #[test]
    fn test_merge_read_response() {
        let options = DecoderOptions {
            merge_read_response: true,
            ..split()
        };
        let out = decode_all(options, &[raw(&[0xBA, 0, 0], &[0, 0x12, 0x34])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label(), "Read buffer: 12 34");
    }

    #[test]
    fn test_write_buffer_payload() {
        let out = decode_all(split(), &[raw(&[0xBC, 0x01, 0xAB], &[0; 3])]);
        assert_eq!(out.len(), 2);
        assert_eq!(labels(&out[0]), ["Write buffer", "WrBuf"]);
        assert_eq!(out[1].class, AnnotationClass::Payload);
        assert_eq!(out[1].label(), "01 AB");
    }

    #[test]
    fn test_polls_unaffected_by_layout() {
        let out = decode_all(
            split(),
            &[
                raw(&[0x26, 0x0A, 0x00], &[0, 0, 3]),
                raw(&[0x26, 0x0A, 0x00], &[0, 0, 3]),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label(), "Glitch timer: 3");
    }
}

// ============================================================================
// Session Tests
// ============================================================================

mod session_tests {
    use super::*;

    #[test]
    fn test_empty_transactions_produce_nothing() {
        let mut capture = CaptureBuilder::default();
        assert!(capture.push_raw(&[], &[]).is_none());
        assert!(capture.push_raw(&[0x54], &[]).is_none());

        let mut decoder = Decoder::new();
        decoder.transfer(Vec::new(), Vec::new());
        decoder.finish();
        assert!(decoder.sink().is_empty());
    }

    #[test]
    fn test_single_data_line_keeps_decoding() {
        let mut decoder = Decoder::new();
        let ok = decoder.decode(FramingEvent::ChipSelectChange {
            old: Some(true),
            new: Some(false),
        });
        assert_eq!(ok, Ok(()));

        let mosi_only = FramingEvent::Data {
            mosi: Some(hwfly_protocol::SpiByte::new(0x54, 0, 8)),
            miso: None,
        };
        assert_eq!(decoder.decode(mosi_only), Ok(()));
        assert!(!decoder.is_halted());

        // Nothing on MISO: the transaction is dropped
        let txn = raw(&[0x54], &[0x00]);
        decoder
            .decode(FramingEvent::Transfer {
                mosi: txn.mosi().to_vec(),
                miso: Vec::new(),
            })
            .unwrap();
        assert!(decoder.sink().is_empty());

        let half_wired = ChannelConfig {
            miso: false,
            ..ChannelConfig::full()
        };
        assert_eq!(decoder.check_channels(&half_wired), Ok(()));
        assert!(!decoder.is_halted());
    }

    #[test]
    fn test_missing_both_data_lines_is_fatal() {
        let mut decoder = Decoder::new();
        decoder.process(&raw(&[0x26, 0x0A, 0x00], &[0, 0, 4]));

        let event = FramingEvent::Data {
            mosi: None,
            miso: None,
        };
        assert_eq!(decoder.decode(event), Err(ChannelError::MissingDataLines));
        assert_eq!(
            ChannelError::MissingDataLines.to_string(),
            "MISO and MOSI pins required."
        );
        assert!(decoder.is_halted());

        decoder.finish();
        assert!(decoder.sink().is_empty());
    }

    #[test]
    fn test_deserialized_transaction_is_checked() {
        let empty = serde_json::from_str::<Transaction>(r#"{"mosi":[],"miso":[]}"#);
        assert!(empty.is_err());
        let no_miso = serde_json::from_str::<Transaction>(
            r#"{"mosi":[{"value":84,"start":0,"end":8}],"miso":[]}"#,
        );
        assert!(no_miso.is_err());

        let txn = raw(&[0x54], &[0x00]);
        let json = serde_json::to_string(&txn).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, txn);

        let mut decoder = Decoder::new();
        decoder.process(&back);
        assert_eq!(decoder.sink()[0].label(), "Do eMMC command");
    }

    #[test]
    fn test_channel_config_check() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.check_channels(&ChannelConfig::full()), Ok(()));

        let no_cs = ChannelConfig {
            chip_select: false,
            ..ChannelConfig::full()
        };
        let err = decoder.check_channels(&no_cs).unwrap_err();
        assert_eq!(err.to_string(), "CS# pin required.");
        assert!(decoder.is_halted());
    }

    #[test]
    fn test_transfer_events_are_decoded() {
        let txn = raw(&[0x54], &[0x00]);
        let mut decoder = Decoder::new();
        decoder
            .decode(FramingEvent::Transfer {
                mosi: txn.mosi().to_vec(),
                miso: txn.miso().to_vec(),
            })
            .unwrap();
        assert_eq!(decoder.sink().len(), 1);
    }

    #[test]
    fn test_glitch_session() {
        let mut fpga = SimulatedFpga::default();
        let mut capture = CaptureBuilder::default();
        let setup = [
            ConfigCommand::SetGlitchOffset(3200),
            ConfigCommand::SetGlitchWidth(40),
            ConfigCommand::SetGlitchTimeout(100),
            ConfigCommand::Control(ControlAction::StartGlitching),
        ];
        for cmd in setup {
            capture.exchange(&mut fpga, &Command::Config(cmd));
        }
        capture.poll(&mut fpga, &flags_poll(), 20);
        fpga.glitch_succeeded(77);
        capture.poll(&mut fpga, &flags_poll(), 2);
        capture.exchange(&mut fpga, &timer_poll());
        capture.exchange(
            &mut fpga,
            &Command::Config(ConfigCommand::Control(ControlAction::StopGlitching)),
        );

        let out = decode_all(DecoderOptions::default(), capture.transactions());
        let got: Vec<_> = out.iter().map(|a| a.label()).collect();
        assert_eq!(
            got,
            [
                "Set glitch offset: 3200",
                "Set glitch width: 40",
                "Set glitch timeout: 100",
                "Start glitching",
                "Flags: NONE",
                "Flags: GLITCH_SUCCESS, GLITCH_DT_CAPTURED, Glitch timer: 77",
                "Stop glitching",
            ]
        );
    }
}

// ============================================================================
// Option Tests
// ============================================================================

mod option_tests {
    use super::*;

    #[test]
    fn test_host_options() {
        let options = DecoderOptions::from_host_options([
            ("merge_same_flag_annots", "no"),
            ("annotation_layout", "split"),
        ])
        .unwrap();
        assert!(!options.merge_polls);
        assert_eq!(options.layout, Layout::Split);
        assert!(!options.merge_read_response);

        let err = DecoderOptions::from_host_options([("annotation_layout", "wide")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value \"wide\" for option annotation_layout (expected compact or split)"
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: DecoderOptions =
            serde_json::from_str(r#"{"annotation_layout":"split","merge_read_response":"yes"}"#)
                .unwrap();
        assert!(options.merge_polls);
        assert_eq!(options.layout, Layout::Split);
        assert!(options.merge_read_response);

        let json = serde_json::to_value(DecoderOptions::default()).unwrap();
        assert_eq!(json["merge_same_flag_annots"], "yes");
        assert_eq!(json["annotation_layout"], "compact");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    // Opcodes the MCU sends plus a few it never does
    fn opcode() -> impl Strategy<Value = u8> {
        prop_oneof![
            Just(0x24u8),
            Just(0x26u8),
            Just(0x54u8),
            Just(0xBAu8),
            Just(0xBCu8),
            Just(0xEEu8),
            any::<u8>(),
        ]
    }

    fn transaction() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
        (opcode(), prop::collection::vec(any::<u8>(), 0..8), 1usize..9).prop_map(
            |(op, rest, miso_len)| {
                let mut mosi = vec![op];
                mosi.extend(rest);
                (mosi, vec![0x5A; miso_len])
            },
        )
    }

    proptest! {
        #[test]
        fn prop_identical_polls_collapse(count in 1usize..40, bits in any::<u8>()) {
            let txns: Vec<_> = (0..count)
                .map(|_| raw(&[0x26, 0x0B, 0x00], &[0, 0, bits]))
                .collect();
            let merged = decode_all(DecoderOptions::default(), &txns);
            prop_assert_eq!(merged.len(), 1);

            let unmerged = decode_all(no_merge(), &txns);
            prop_assert_eq!(unmerged.len(), count);
            prop_assert!(unmerged.iter().all(|a| a.labels == merged[0].labels));
        }

        #[test]
        fn prop_every_transaction_is_accounted_for(
            capture in prop::collection::vec(transaction(), 1..20)
        ) {
            let mut builder = CaptureBuilder::default();
            for (mosi, miso) in &capture {
                builder.push_raw(mosi, miso);
            }
            let txns = builder.into_transactions();
            let first = txns[0].span().start;
            let last = txns[txns.len() - 1].span().end;

            let out = decode_all(DecoderOptions::default(), &txns);
            let polls = txns.iter().filter(|t| t.opcode() == 0x26).count();
            prop_assert!(out.len() >= txns.len() - polls);
            for annotation in &out {
                prop_assert!(annotation.span.start <= annotation.span.end);
                prop_assert!(annotation.span.start >= first && annotation.span.end <= last);
                prop_assert!(!annotation.labels.is_empty());
            }
        }

        #[test]
        fn prop_unknown_config_subs_are_garbage(sub in any::<u8>(), value in any::<u8>()) {
            prop_assume!(![0x01u8, 0x02, 0x03, 0x05, 0x06, 0x08].contains(&sub));
            let out = decode_all(DecoderOptions::default(), &[raw(&[0x24, sub, value], &[0; 3])]);
            prop_assert_eq!(out.len(), 1);
            prop_assert_eq!(out[0].class, AnnotationClass::Garbage);
        }
    }
}
