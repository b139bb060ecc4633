use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use script::Engine;
use script_test_support::{StaticLoader, WriteEngine};
use swrite::Swrite;

fn rewrite_with(loader: StaticLoader, html: &str) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let pipeline = Swrite::with_loader(Arc::new(WriteEngine), Arc::new(loader));
    let (tx, rx) = mpsc::channel();
    pipeline.transform(html, move |out| {
        let _ = tx.send(out);
    });
    rx.recv_timeout(Duration::from_secs(10))
        .expect("transform callback fired")
}

fn rewrite(html: &str) -> String {
    rewrite_with(StaticLoader::new(), html)
}

#[test]
fn script_free_input_round_trips_through_the_tree() {
    let html = "<div id=\"a\"><p>hi &amp; bye</p><br></div>";
    assert_eq!(rewrite(html), html::serialize(&html::parse(html)));
}

#[test]
fn empty_input_stays_empty() {
    assert_eq!(rewrite(""), "");
}

#[test]
fn inline_write_replaces_the_script_tag() {
    assert_eq!(rewrite("<script>write(\"<div></div>\")</script>"), "<div></div>");
}

#[test]
fn written_output_lands_where_the_scripts_stood() {
    assert_eq!(
        rewrite("<p>before</p><script>write('<b>mid</b>')</script><p>after</p>"),
        "<p>before</p><b>mid</b><p>after</p>"
    );
}

#[test]
fn writes_splice_inside_a_nested_parent() {
    assert_eq!(
        rewrite("<div id=\"box\"><script>write('inner')</script></div>"),
        "<div id=\"box\">inner</div>"
    );
}

#[test]
fn nested_written_scripts_resolve_recursively() {
    assert_eq!(
        rewrite("<script>write('<scr'+'ipt>write(\"bar\")</scr'+'ipt>')</script>"),
        "bar"
    );
}

#[test]
fn triply_nested_written_scripts_resolve() {
    // The outer script writes a script that writes a script; inner quote
    // levels alternate, with the deepest quotes escaped.
    let html = r#"<script>write('<scr'+'ipt>write("<scr"+"ipt>write(\'deep\')</scr"+"ipt>")</scr'+'ipt>')</script>"#;
    assert_eq!(rewrite(html), "deep");
}

#[test]
fn fragmented_writes_reassemble_one_tag() {
    assert_eq!(
        rewrite(
            "<script>write('<div ')</script><script>write('class=\"x\">y</div>')</script>"
        ),
        "<div class=\"x\">y</div>"
    );
}

#[test]
fn scripts_under_different_parents_resolve_independently() {
    // One level of nesting difference: no shared position, no panic.
    assert_eq!(
        rewrite("<div><script>write('a')</script></div><script>write('b')</script>"),
        "<div>a</div>b"
    );
}

#[test]
fn remote_script_body_is_fetched_and_captured() {
    let loader = StaticLoader::new().with_script("http://cdn/x.js", "write('<i>r</i>')");
    assert_eq!(
        rewrite_with(loader, "<script src=\"http://cdn/x.js\"></script>"),
        "<i>r</i>"
    );
}

#[test]
fn remote_and_inline_scripts_in_one_position_keep_document_order() {
    let loader = StaticLoader::new().with_script("http://cdn/two.js", "write('2')");
    let html = "<script>write('1')</script>\
                <script src=\"http://cdn/two.js\"></script>\
                <script>write('3')</script>";
    assert_eq!(rewrite_with(loader, html), "123");
}

#[test]
fn remote_load_failure_degrades_to_no_output() {
    let loader = StaticLoader::new().with_failure("http://cdn/gone.js", "404");
    assert_eq!(
        rewrite_with(loader, "<p>a</p><script src=\"http://cdn/gone.js\"></script><p>b</p>"),
        "<p>a</p><p>b</p>"
    );
}

#[test]
fn unknown_url_degrades_to_no_output() {
    assert_eq!(
        rewrite("<script src=\"http://cdn/unmapped.js\"></script>ok"),
        "ok"
    );
}

#[test]
fn failing_script_keeps_what_it_wrote_before_failing() {
    assert_eq!(
        rewrite("<script>write('a'); fail('nope'); write('z')</script><p>ok</p>"),
        "a<p>ok</p>"
    );
}

#[test]
fn empty_inline_script_is_simply_removed() {
    assert_eq!(rewrite("<a></a><script></script><b></b>"), "<a></a><b></b>");
}

#[test]
fn position_attribute_never_reaches_the_output() {
    let out = rewrite("<script>write('<p>x</p>')</script><q></q><script>write('y')</script>");
    assert_eq!(out, "<p>x</p><q></q>y");
    assert!(!out.contains("position"));
}

#[test]
fn concurrent_calls_both_complete_with_their_own_results() {
    let _ = env_logger::builder().is_test(true).try_init();
    let pipeline = Swrite::with_loader(Arc::new(WriteEngine), Arc::new(StaticLoader::new()));
    let (tx, rx) = mpsc::channel();

    let tx_a = tx.clone();
    pipeline.transform("<script>sleep(30); write('first')</script>", move |out| {
        let _ = tx_a.send(("a", out));
    });
    let tx_b = tx;
    pipeline.transform("<script>write('second')</script>", move |out| {
        let _ = tx_b.send(("b", out));
    });

    let mut results = std::collections::HashMap::new();
    for _ in 0..2 {
        let (tag, out) = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("both callbacks fire");
        results.insert(tag, out);
    }
    assert_eq!(results["a"], "first");
    assert_eq!(results["b"], "second");
}

/// Delegates to [`WriteEngine`] but panics on a marker, standing in for a
/// caller-supplied engine that blows up instead of returning an error.
struct PanickyEngine;

impl Engine for PanickyEngine {
    fn eval(&self, code: &str) -> Result<(), script::EvalError> {
        if code.contains("explode") {
            panic!("engine exploded");
        }
        WriteEngine.eval(code)
    }
}

#[test]
fn engine_panic_does_not_wedge_the_queue() {
    let _ = env_logger::builder().is_test(true).try_init();
    let pipeline = Swrite::with_loader(Arc::new(PanickyEngine), Arc::new(StaticLoader::new()));
    let (tx, rx) = mpsc::channel();

    let panicking = "<p>kept</p><script>explode()</script>";
    let tx_a = tx.clone();
    pipeline.transform(panicking, move |out| {
        let _ = tx_a.send(("a", out));
    });
    let tx_b = tx;
    pipeline.transform("<script>write('healthy')</script>", move |out| {
        let _ = tx_b.send(("b", out));
    });

    let mut results = std::collections::HashMap::new();
    for _ in 0..2 {
        let (tag, out) = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("both callbacks fire even though the first call panicked");
        results.insert(tag, out);
    }
    // The panicking call degrades to its input unchanged; the call behind
    // it still runs to completion.
    assert_eq!(results["a"], panicking);
    assert_eq!(results["b"], "healthy");
}

#[test]
fn queued_calls_run_in_arrival_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let pipeline = Swrite::with_loader(Arc::new(WriteEngine), Arc::new(StaticLoader::new()));
    let (tx, rx) = mpsc::channel();

    for tag in ["a", "b", "c"] {
        let tx = tx.clone();
        // The sleep keeps the first session alive long enough for the
        // later submissions to queue behind it.
        let html = format!("<script>sleep(20); write('{tag}')</script>");
        pipeline.transform(html, move |out| {
            let _ = tx.send(out);
        });
    }

    let order: Vec<String> = (0..3)
        .map(|_| {
            rx.recv_timeout(Duration::from_secs(10))
                .expect("callback fired")
        })
        .collect();
    assert_eq!(order, ["a", "b", "c"]);
}
