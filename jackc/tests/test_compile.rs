use jackc::compile_str;

/// Compile and split into lines, failing the test with the rendered error.
fn compile_lines(source_code: &str) -> Vec<String> {
    match compile_str(source_code) {
        Ok(code) => code.lines().map(str::to_owned).collect(),
        Err(err) => panic!("compilation failed\n{}", err),
    }
}

fn expected_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn assert_vm(source_code: &str, expected: &str) {
    assert_eq!(compile_lines(source_code), expected_lines(expected));
}

#[test]
fn test_method_returns_field() {
    let source = r#"
    class C {
        field int x, y;
        method int m() {
            return x;
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function C.m 0
        push argument 0
        pop pointer 0
        push this 0
        return
        "#,
    );
}

#[test]
fn test_point_program() {
    assert_vm(
        include_str!("programs/Point.jack"),
        r#"
        function Point.new 0
        push constant 2
        call Memory.alloc 1
        pop pointer 0
        push argument 0
        pop this 0
        push argument 1
        pop this 1
        push static 0
        push constant 1
        add
        pop static 0
        push pointer 0
        return
        function Point.getX 0
        push argument 0
        pop pointer 0
        push this 0
        return
        function Point.distance 1
        push argument 0
        pop pointer 0
        push this 0
        push argument 1
        call Point.getX 1
        sub
        pop local 0
        push local 0
        push local 0
        call Math.multiply 2
        return
        "#,
    );
}

#[test]
fn test_control_flow_labels() {
    assert_vm(
        include_str!("programs/Main.jack"),
        r#"
        function Main.main 1
        push constant 0
        pop local 0
        label L0
        push local 0
        push constant 10
        lt
        not
        if-goto L1
        push local 0
        push constant 5
        eq
        not
        if-goto L2
        push local 0
        call Output.printInt 1
        pop temp 0
        goto L3
        label L2
        push local 0
        push constant 1
        add
        pop local 0
        label L3
        push local 0
        push constant 1
        add
        pop local 0
        goto L0
        label L1
        push local 0
        push constant 3
        gt
        not
        not
        if-goto L4
        push constant 0
        return
        goto L5
        label L4
        label L5
        push constant 0
        return
        "#,
    );
}

#[test]
fn test_array_assignment() {
    let source = r#"
    class Main {
        function void main() {
            var int p, i;
            var Array a;
            let i = 3;
            let a[i] = 5;
            return;
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Main.main 3
        push constant 3
        pop local 1
        push local 2
        push local 1
        add
        push constant 5
        pop temp 0
        pop pointer 1
        push temp 0
        pop that 0
        push constant 0
        return
        "#,
    );
}

#[test]
fn test_array_read_into_array_write() {
    let source = r#"
    class Main {
        function void copy(Array dst, Array src, int i) {
            let dst[i] = src[i + 1];
            return;
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Main.copy 0
        push argument 0
        push argument 2
        add
        push argument 1
        push argument 2
        push constant 1
        add
        add
        pop pointer 1
        push that 0
        pop temp 0
        pop pointer 1
        push temp 0
        pop that 0
        push constant 0
        return
        "#,
    );
}

#[test]
fn test_call_on_undeclared_prefix() {
    let source = r#"
    class Main {
        function void main() {
            do foo.bar(1);
            return;
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Main.main 0
        push constant 1
        call foo.bar 1
        pop temp 0
        push constant 0
        return
        "#,
    );
}

#[test]
fn test_method_call_shapes() {
    let source = r#"
    class Game {
        field Square square;
        method void run() {
            do square.moveUp();
            do draw(1, 2);
            do Sys.wait(5);
            return;
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Game.run 0
        push argument 0
        pop pointer 0
        push this 0
        call Square.moveUp 1
        pop temp 0
        push pointer 0
        push constant 1
        push constant 2
        call Game.draw 3
        pop temp 0
        push constant 5
        call Sys.wait 1
        pop temp 0
        push constant 0
        return
        "#,
    );
}

#[test]
fn test_keyword_constants_and_strings() {
    let source = r#"
    class Main {
        function void main() {
            var String s;
            var boolean b;
            let s = "Hi!";
            let b = true;
            let b = false;
            let s = null;
            do s.dispose();
            return;
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Main.main 2
        push constant 3
        call String.new 1
        push constant 72
        call String.appendChar 2
        push constant 105
        call String.appendChar 2
        push constant 33
        call String.appendChar 2
        pop local 0
        push constant 0
        not
        pop local 1
        push constant 0
        pop local 1
        push constant 0
        pop local 0
        push local 0
        call String.dispose 1
        pop temp 0
        push constant 0
        return
        "#,
    );
}

#[test]
fn test_empty_string() {
    let source = r#"
    class Main {
        function String empty() {
            return "";
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Main.empty 0
        push constant 0
        call String.new 1
        return
        "#,
    );
}

#[test]
fn test_operators_apply_left_to_right() {
    let source = r#"
    class Main {
        function int calc(int a, int b) {
            return a + b * 3 / -a & ~b | (a = b);
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Main.calc 0
        push argument 0
        push argument 1
        add
        push constant 3
        call Math.multiply 2
        push argument 0
        neg
        call Math.divide 2
        push argument 1
        not
        and
        push argument 0
        push argument 1
        eq
        or
        return
        "#,
    );
}

#[test]
fn test_labels_are_unique_across_subroutines() {
    let source = r#"
    class Main {
        function void a(boolean c) {
            if (c) { return; }
            return;
        }
        function void b(boolean c) {
            while (c) { let c = false; }
            return;
        }
    }
    "#;

    let lines = compile_lines(source);
    let labels: Vec<&str> = lines
        .iter()
        .filter_map(|line| line.strip_prefix("label "))
        .collect();
    assert_eq!(labels, vec!["L0", "L1", "L2", "L3"]);
}

#[test]
fn test_empty_class() {
    assert_vm("class Empty { }", "");
    assert_vm("class Empty { field int x; static Foo y; }", "");
}

#[test]
fn test_constructor_without_fields() {
    let source = r#"
    class Unit {
        constructor Unit new() {
            return this;
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Unit.new 0
        push constant 0
        call Memory.alloc 1
        pop pointer 0
        push pointer 0
        return
        "#,
    );
}

#[test]
fn test_locals_shadow_fields() {
    let source = r#"
    class Shadow {
        field int x;
        method int get(int x) {
            return x;
        }
        method int own() {
            return x;
        }
    }
    "#;

    assert_vm(
        source,
        r#"
        function Shadow.get 0
        push argument 0
        pop pointer 0
        push argument 1
        return
        function Shadow.own 0
        push argument 0
        pop pointer 0
        push this 0
        return
        "#,
    );
}

#[test]
fn test_compile_into_writer() {
    let source = "class A { function int one() { return 1; } }";
    let out = jackc::compile(source, Vec::new()).expect("compile into vector");
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "function A.one 0\npush constant 1\nreturn\n"
    );
}
