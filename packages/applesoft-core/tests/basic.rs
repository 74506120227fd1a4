//! End-to-end BASIC programs through the interpreter, scripted console
//! included.

mod util;

use std::cell::RefCell;
use std::rc::Rc;

use applesoft_core::basic::Value;
use applesoft_core::devices::bus::apple_memory_map;
use applesoft_core::devices::cpu::HaltState;
use applesoft_core::devices::speaker::ClickCounter;
use util::{run_program, run_with_input};

#[test]
fn print_evaluates_with_precedence() {
    let output = run_program("10 PRINT 2+3*4");
    assert_eq!(output, " 14\n");
}

#[test]
fn for_next_counts_in_order() {
    let output = run_program("10 FOR I=1 TO 3: PRINT I: NEXT I");
    assert_eq!(output, " 1\n 2\n 3\n");
}

#[test]
fn for_trip_count_follows_the_step() {
    let output = run_program("10 C = 0\n20 FOR I=1 TO 10 STEP 3: C = C + 1: NEXT\n30 PRINT C");
    // floor((10-1)/3) + 1 = 4
    assert_eq!(output, " 4\n");

    let output = run_program("10 C = 0\n20 FOR I=5 TO 1 STEP -2: C = C + 1: NEXT\n30 PRINT C");
    assert_eq!(output, " 3\n");
}

#[test]
fn for_body_runs_once_even_when_start_exceeds_end() {
    let output = run_program("10 FOR I=5 TO 1: PRINT I: NEXT");
    assert_eq!(output, " 5\n");
}

#[test]
fn gosub_returns_to_the_statement_after() {
    let output = run_program("10 GOSUB 100: PRINT \"BACK\": END\n100 PRINT \"SUB\": RETURN");
    assert_eq!(output, "SUB\nBACK\n");
}

#[test]
fn gosub_stack_balances() {
    let source = "10 GOSUB 100\n20 END\n100 GOSUB 200\n110 RETURN\n200 RETURN";
    let (interp, _) = run_with_input(source, &[]);
    assert_eq!(interp.gosub_depth(), 0);
}

#[test]
fn usr_bridge_stages_the_fac() {
    // an RTS at the USR vector: the call returns immediately and the FAC
    // still holds the argument
    let source = "10 POKE 10, 96\n20 X = USR(42.5)\n30 PRINT \"CALLED\"";
    let (interp, output) = run_with_input(source, &[]);

    assert!(output.contains("CALLED"));
    let expected = 42.5f32.to_le_bytes();
    for (i, byte) in expected.iter().enumerate() {
        assert_eq!(interp.mem.peek(apple_memory_map::FAC + i as u32), *byte);
    }
    assert_eq!(interp.mem.peek(apple_memory_map::FAC_SIGN), 0x00);
    assert_eq!(interp.var("X"), Value::Number(42.5));
}

#[test]
fn call_runs_machine_code() {
    // LDA #$42; STA $0200; BRK, poked in from BASIC
    let source = "\
10 POKE 768,169: POKE 769,66
20 POKE 770,141: POKE 771,0: POKE 772,2
30 POKE 773,0
40 CALL 768
50 PRINT PEEK(512)";
    let (interp, output) = run_with_input(source, &[]);
    assert_eq!(output, " 66\n");
    assert_eq!(interp.cpu.state.halt, HaltState::Brk);
}

#[test]
fn call_bell_beeps_without_stepping() {
    let speaker = Rc::new(RefCell::new(ClickCounter::default()));
    let mut interp = applesoft_core::basic::Interpreter::new();
    interp.set_speaker(speaker.clone());
    let cycles_before = interp.cpu.state.cycles;
    util::run_on(&mut interp, "10 CALL -1059", &[]);
    assert_eq!(speaker.borrow().beeps, 1);
    assert_eq!(interp.cpu.state.cycles, cycles_before);
}

#[test]
fn peek_of_the_speaker_clicks() {
    let speaker = Rc::new(RefCell::new(ClickCounter::default()));
    let mut interp = applesoft_core::basic::Interpreter::new();
    interp.set_speaker(speaker.clone());
    util::run_on(&mut interp, "10 A = PEEK(-16336)", &[]);
    assert_eq!(speaker.borrow().clicks, 1);
}

#[test]
fn ampersand_jumps_through_the_vector() {
    // an RTS at $03F5
    let source = "10 POKE 1013, 96\n20 &\n30 PRINT \"AFTER\"";
    let (interp, output) = run_with_input(source, &[]);
    assert!(output.contains("AFTER"));
    assert!(interp.cpu.state.cycles > 0);
}

#[test]
fn poke_peek_round_trip() {
    let output = run_program("10 POKE 2000, 123\n20 PRINT PEEK(2000)");
    assert_eq!(output, " 123\n");
}

#[test]
fn data_read_restore() {
    let source = "\
10 DATA 1, 2
20 DATA HELLO, \"WORLD, AGAIN\"
30 READ A, B, C$, D$
40 PRINT A + B
50 PRINT C$
60 PRINT D$
70 RESTORE 20: READ E$
80 PRINT E$";
    let output = run_program(source);
    assert_eq!(output, " 3\nHELLO\nWORLD, AGAIN\nHELLO\n");
}

#[test]
fn reading_past_the_pool_is_out_of_data() {
    let output = run_program("10 DATA 1\n20 READ A, B");
    assert_eq!(output, "?OUT OF DATA ERROR IN 20\n");
}

#[test]
fn def_fn_binds_and_restores_its_parameter() {
    let source = "\
10 DEF FN SQ(X) = X * X
20 X = 7
30 PRINT FN SQ(4)
40 PRINT X";
    let output = run_program(source);
    assert_eq!(output, " 16\n 7\n");
}

#[test]
fn variable_names_alias_on_two_characters() {
    let output = run_program("10 COUNT = 5\n20 PRINT COUNTY");
    assert_eq!(output, " 5\n");
}

#[test]
fn arrays_dim_and_auto_dim() {
    let source = "\
10 DIM A(2,2)
20 A(1,2) = 9
30 PRINT A(1,2)
40 B(10) = 3
50 PRINT B(10)";
    let output = run_program(source);
    assert_eq!(output, " 9\n 3\n");
}

#[test]
fn out_of_bounds_subscript_fails() {
    let output = run_program("10 B(11) = 1");
    assert_eq!(output, "?ILLEGAL QUANTITY ERROR IN 10\n");
}

#[test]
fn redim_fails() {
    let output = run_program("10 DIM A(5)\n20 DIM A(5)");
    assert_eq!(output, "?REDIM'D ARRAY ERROR IN 20\n");
}

#[test]
fn type_mismatch_reports() {
    let output = run_program("10 A$ = 5");
    assert_eq!(output, "?TYPE MISMATCH ERROR IN 10\n");
}

#[test]
fn next_without_for_reports() {
    let output = run_program("10 NEXT I");
    assert_eq!(output, "?NEXT WITHOUT FOR ERROR IN 10\n");
}

#[test]
fn return_without_gosub_reports() {
    let output = run_program("10 RETURN");
    assert_eq!(output, "?RETURN WITHOUT GOSUB ERROR IN 10\n");
}

#[test]
fn stop_prints_break_with_the_line() {
    let output = run_program("10 PRINT \"A\"\n20 STOP\n30 PRINT \"B\"");
    assert_eq!(output, "A\nBREAK IN 20\n");
}

#[test]
fn end_is_silent() {
    let output = run_program("10 PRINT \"A\"\n20 END\n30 PRINT \"B\"");
    assert_eq!(output, "A\n");
}

#[test]
fn on_goto_selects_and_falls_through() {
    let source = "\
10 X = 2
20 ON X GOTO 100, 200
30 PRINT \"FELL\"
40 END
100 PRINT \"ONE\": END
200 PRINT \"TWO\": END";
    assert_eq!(run_program(source), "TWO\n");

    let source = "\
10 X = 9
20 ON X GOTO 100, 200
30 PRINT \"FELL\"
40 END
100 PRINT \"ONE\": END
200 PRINT \"TWO\": END";
    assert_eq!(run_program(source), "FELL\n");
}

#[test]
fn on_gosub_comes_back() {
    let source = "\
10 ON 1 GOSUB 100
20 PRINT \"BACK\": END
100 PRINT \"SUB\": RETURN";
    assert_eq!(run_program(source), "SUB\nBACK\n");
}

#[test]
fn if_then_with_line_number_jumps() {
    let source = "\
10 A = 3
20 IF A > 2 THEN 100
30 PRINT \"NO\": END
100 PRINT \"YES\"";
    assert_eq!(run_program(source), "YES\n");
}

#[test]
fn string_builtins() {
    let source = "\
10 A$ = \"APPLESOFT\"
20 PRINT LEFT$(A$, 5)
30 PRINT RIGHT$(A$, 4)
40 PRINT MID$(A$, 2, 3)
50 PRINT LEN(A$)
60 PRINT CHR$(65); ASC(\"B\")
70 PRINT STR$(12) + \"!\"
80 PRINT VAL(\"12.5AB\")";
    let output = run_program(source);
    assert_eq!(
        output,
        "APPLE\nSOFT\nPPL\n 9\nA 66\n12!\n 12.5\n"
    );
}

#[test]
fn numeric_functions() {
    let source = "\
10 PRINT ABS(-3); SGN(-2); SGN(0); SGN(9)
20 PRINT INT(2.7); INT(-2.7)
30 PRINT SQR(16)";
    let output = run_program(source);
    assert_eq!(output, " 3-1 0 1\n 2-3\n 4\n");
}

#[test]
fn print_zones_and_separators() {
    let output = run_program("10 PRINT 1,2");
    assert_eq!(output, " 1               2\n");

    let output = run_program("10 PRINT \"A\";: PRINT \"B\"");
    assert_eq!(output, "AB\n");

    let output = run_program("10 PRINT \"X\"; TAB(10); \"Y\"");
    assert_eq!(output, "X        Y\n");
}

#[test]
fn input_assigns_and_echoes() {
    let (interp, output) = run_with_input("10 INPUT A\n20 PRINT A * 2", &["21"]);
    assert_eq!(interp.var("A"), Value::Number(21.0));
    assert!(output.ends_with(" 42\n"));
}

#[test]
fn input_with_prompt_and_multiple_fields() {
    let (interp, _) =
        run_with_input("10 INPUT \"COORDS: \"; X, Y", &["3, 4"]);
    assert_eq!(interp.var("X"), Value::Number(3.0));
    assert_eq!(interp.var("Y"), Value::Number(4.0));
}

#[test]
fn input_redo_from_start() {
    let (_, output) = run_with_input("10 INPUT A\n20 PRINT A", &["NOPE", "8"]);
    assert!(output.contains("??REDO FROM START"));
    assert!(output.ends_with(" 8\n"));
}

#[test]
fn get_reads_single_keys() {
    let (interp, _) = run_with_input("10 GET A$\n20 GET B$", &["XY"]);
    assert_eq!(interp.var("A$"), Value::Str("X".into()));
    assert_eq!(interp.var("B$"), Value::Str("Y".into()));
}

#[test]
fn integer_variables_truncate() {
    let output = run_program("10 N% = 7.9\n20 PRINT N%");
    assert_eq!(output, " 7\n");
}

#[test]
fn lores_plot_writes_screen_memory() {
    let source = "10 GR\n20 COLOR= 5\n30 PLOT 0,0\n40 PRINT PEEK(1024)";
    // color 5 in the low nibble of the first text-page cell
    assert_eq!(run_program(source), " 5\n");
}

#[test]
fn hplot_sets_hires_bits() {
    let source = "10 HGR\n20 HCOLOR= 3\n30 HPLOT 0,0 TO 7,0\n40 PRINT PEEK(8192)";
    // pixels 0..6 of the first byte set, palette bit clear
    assert_eq!(run_program(source), " 127\n");
}

#[test]
fn nested_for_loops() {
    let source = "\
10 FOR I=1 TO 2
20 FOR J=1 TO 2
30 PRINT I * 10 + J
40 NEXT J
50 NEXT I";
    assert_eq!(run_program(source), " 11\n 12\n 21\n 22\n");
}

#[test]
fn next_with_list_closes_both_loops() {
    let source = "\
10 FOR I=1 TO 2
20 FOR J=1 TO 2
30 PRINT I * 10 + J
40 NEXT J, I";
    assert_eq!(run_program(source), " 11\n 12\n 21\n 22\n");
}

#[test]
fn restarting_a_for_variable_replaces_the_frame() {
    // the inner FOR I replaces the outer one instead of nesting
    let source = "\
10 FOR I=1 TO 2
20 FOR I=1 TO 2
30 PRINT I
40 NEXT I";
    let (interp, output) = run_with_input(source, &[]);
    assert_eq!(output, " 1\n 2\n");
    assert_eq!(interp.for_depth(), 0);
}

#[test]
fn clear_wipes_variables() {
    let output = run_program("10 A = 5\n20 CLEAR\n30 PRINT A");
    assert_eq!(output, " 0\n");
}

#[test]
fn rem_and_ampersand_noise_are_ignored() {
    let output = run_program("10 REM NOTHING TO SEE: PRINT \"HIDDEN\"\n20 PRINT \"DONE\"");
    assert_eq!(output, "DONE\n");
}

#[test]
fn division_by_zero_message() {
    assert_eq!(run_program("10 PRINT 1/0"), "?DIVISION BY ZERO ERROR IN 10\n");
}

#[test]
fn undefined_function_reports() {
    assert_eq!(
        run_program("10 PRINT FN NOPE(1)"),
        "?UNDEF'D FUNCTION ERROR IN 10\n"
    );
}

#[test]
fn sleep_zero_returns_immediately() {
    assert_eq!(run_program("10 SLEEP 0\n20 PRINT \"OK\""), "OK\n");
}

#[test]
fn transcendentals_come_out_approximately_right() {
    use applesoft_core::basic::value::approximately_equals;

    let (interp, _) = run_with_input("10 A = ATN(1) * 4\n20 B = EXP(LOG(7))", &[]);
    assert!(approximately_equals(
        interp.var("A").as_number(),
        std::f64::consts::PI
    ));
    assert!(approximately_equals(interp.var("B").as_number(), 7.0));
}

#[test]
fn lomem_himem_feed_fre() {
    let output = run_program("10 LOMEM: 4096\n20 HIMEM: 8192\n30 PRINT FRE(0)");
    assert_eq!(output, " 4096\n");
}
