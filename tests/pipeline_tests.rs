//! End-to-end pipeline tests: source text in, executed
//! Wasm out. The produced binaries are instantiated with
//! wasmtime and observed through the exported `test`
//! function.

use wasmtime::{Engine, Instance, Module, Store};

const PREAMBLE: [u8; 8] = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];


fn compile(source: &str) -> Vec<u8> {
    let bytes = mood::compile(source)
        .unwrap_or_else(|e| panic!("compile failed:\n{e}"));

    assert_eq!(&bytes[0..8], &PREAMBLE);
    bytes
}


fn run_test(source: &str) -> i32 {
    let bytes = compile(source);

    let engine = Engine::default();
    let module = Module::new(&engine, &bytes)
        .unwrap_or_else(|e| panic!("module does not validate: {e}"));

    let mut store = Store::new(&engine, ());
    let instance = Instance::new(&mut store, &module, &[]).unwrap();

    let func = instance.get_typed_func::<(), i32>(&mut store, "test").unwrap();
    func.call(&mut store, ()).unwrap()
}


#[test]
fn function_calls() {
    let source = "pub fn add(a: i32, b: i32): i32 { a + b } \
                  pub fn test(): i32 { add(1_i32, 2_i32) }";

    assert_eq!(run_test(source), 3);
}


#[test]
fn products_bind_tighter_than_sums() {
    assert_eq!(run_test("pub fn test(): i32 { 2_i32 + 3_i32 * 4_i32 }"), 14);
}


#[test]
fn structs_live_in_linear_memory() {
    let source = "struct Box { w: i32, h: i32 } \
                  fn area(b: Box): i32 { b.w * b.h } \
                  pub fn test(): i32 { let a: Box = Box { w: 10_i32, h: 20_i32 }; area(a) }";

    assert_eq!(run_test(source), 200);
}


#[test]
fn call_sites_get_distinct_stack_slots() {
    // the second call must not clobber `foo`
    let source = "struct Foo { x: i32 } \
                  fn other(x: i32): Foo { Foo { x: x } } \
                  pub fn test(): i32 { let foo: Foo = other(10_i32); other(20_i32); foo.x }";

    assert_eq!(run_test(source), 10);
}


#[test]
fn booleans_lower_to_i32() {
    assert_eq!(run_test("pub fn test(): i32 { 1_i32 == 1_i32 }"), 1);
}


#[test]
fn float_arithmetic() {
    let source = "fn half(x: f64): f64 { x * 0.5_f64 } \
                  pub fn test(): i32 { half(3_f64) == 1.5_f64 }";

    assert_eq!(run_test(source), 1);
}


#[test]
fn enum_variants_compare_by_tag() {
    let source = "enum Colour { Red, Green, Blue } \
                  pub fn test(): i32 { let c: Colour = Colour::Green; c == Colour::Green }";

    assert_eq!(run_test(source), 1);
}


#[test]
fn recursive_calls_resolve() {
    let source = "fn helper(x: i32): i32 { picked(x) } \
                  fn picked(x: i32): i32 { x + 1_i32 } \
                  pub fn test(): i32 { helper(41_i32) }";

    assert_eq!(run_test(source), 42);
}


#[test]
fn excess_variant_arguments_diagnose() {
    let source = "enum Maybe { Some(i32), None } \
                  pub fn test(): i32 { let x: Maybe = Maybe::Some(10_i32, 20_i32, 30_i32); 10_i32 }";

    let diagnostic = mood::compile(source).unwrap_err();

    let expected = format!(
        "Error: Variant \"Some\" is not a unit variant. \
         Expected a single value argument, but got 3.:\n \
         --> main.mood:1:88\n\n1 | {source}\n  | {}{} expected exactly one argument\n",
        " ".repeat(87),
        "^".repeat(14),
    );

    assert_eq!(diagnostic, expected);
}


#[test]
fn type_mismatches_diagnose() {
    let diagnostic = mood::compile("pub fn test(): i32 { 1_f64 }").unwrap_err();

    assert!(diagnostic.starts_with(
        "Error: Expected a value of type \"i32\", but found \"f64\":\n"),
        "unexpected diagnostic:\n{diagnostic}");
    assert!(diagnostic.contains(" --> main.mood:1:22\n"));
}


// =======================================================
// Structural properties of the emitted binary
// =======================================================

fn read_u32_leb(bytes: &[u8], at: &mut usize) -> u32 {
    let mut result = 0;
    let mut shift = 0;
    loop {
        let byte = bytes[*at];
        *at += 1;
        result |= ((byte & 0x7F) as u32) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    result
}


fn find_section(bytes: &[u8], id: u8) -> Option<&[u8]> {
    let mut at = 8;
    while at < bytes.len() {
        let section = bytes[at];
        at += 1;
        let len = read_u32_leb(bytes, &mut at) as usize;
        if section == id {
            return Some(&bytes[at..at + len]);
        }
        at += len;
    }
    None
}


#[test]
fn identical_signatures_share_a_type() {
    let source = "fn a(x: i32): i32 { x } \
                  fn b(x: i32): i32 { x } \
                  fn c(x: i32): i32 { x } \
                  pub fn test(): i32 { a(1_i32) + b(2_i32) + c(3_i32) }";

    let bytes = compile(source);
    let types = find_section(&bytes, 1).unwrap();

    // (i32) -> i32 appears once, () -> i32 once
    let mut at = 0;
    assert_eq!(read_u32_leb(types, &mut at), 2);
}


#[test]
fn public_functions_export_under_their_name() {
    let source = "fn helper(x: i32): i32 { x } \
                  pub fn double(x: i32): i32 { x + x } \
                  pub fn test(): i32 { double(helper(21_i32)) }";

    let bytes = compile(source);
    let exports = find_section(&bytes, 7).unwrap();

    let mut at = 0;
    let count = read_u32_leb(exports, &mut at);

    let mut names = Vec::new();
    for _ in 0..count {
        let len = read_u32_leb(exports, &mut at) as usize;
        let name = std::str::from_utf8(&exports[at..at + len]).unwrap().to_string();
        at += len;
        let kind = exports[at];
        at += 1;
        let index = read_u32_leb(exports, &mut at);
        names.push((name, kind, index));
    }

    // both pub functions, by name, as function exports;
    // the memory rides along
    assert!(names.iter().any(|x| x.0 == "double" && x.1 == 0x00));
    assert!(names.iter().any(|x| x.0 == "test" && x.1 == 0x00));
    assert!(names.iter().any(|x| x.0 == "memory" && x.1 == 0x02));
    assert_eq!(names.iter().filter(|x| x.1 == 0x00).count(), 2);
}


#[test]
fn sections_appear_in_canonical_order() {
    let source = "pub fn test(): i32 { 0_i32 }";
    let bytes = compile(source);

    let mut at = 8;
    let mut previous = 0;
    while at < bytes.len() {
        let id = bytes[at];
        at += 1;
        assert!(id > previous, "section {id} out of order");
        previous = id;

        let len = read_u32_leb(&bytes, &mut at) as usize;
        at += len;
    }
    assert_eq!(at, bytes.len());
}
