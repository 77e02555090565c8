use super::*;

fn parse(sql: &str) -> Vec<String> {
    ScriptExecutor::parse_script(sql).statements
}

#[test]
fn test_simple_statements() {
    let sql = "CREATE TABLE A (ID INTEGER);\nCREATE TABLE B (ID INTEGER);";
    let stmts = parse(sql);
    assert_eq!(
        stmts,
        vec!["CREATE TABLE A (ID INTEGER)", "CREATE TABLE B (ID INTEGER)"]
    );
}

#[test]
fn test_directive_scoping() {
    let sql = "A;\nSET TERM ^ ;\nB^\nC^\nSET TERM ; ^\nD;";
    let script = ScriptExecutor::parse_script(sql);
    assert!(script.uses_directives);
    assert_eq!(script.statements, vec!["A", "B", "C", "D"]);
}

#[test]
fn test_directive_scoping_two_statements_on_one_line() {
    let sql = "A;\nSET TERM ^ ;\nB^C^\nSET TERM ; ^\nD;";
    assert_eq!(parse(sql), vec!["A", "B", "C", "D"]);
}

#[test]
fn test_procedure_body_keeps_default_terminator() {
    let sql = r#"SET TERM ^ ;
CREATE PROCEDURE P
AS
DECLARE VARIABLE X INTEGER;
BEGIN
  X = 1;
  SUSPEND;
END^
SET TERM ; ^"#;
    let stmts = parse(sql);
    assert_eq!(stmts.len(), 1, "Should have 1 statement, got: {:?}", stmts);
    assert_eq!(
        stmts[0],
        "CREATE PROCEDURE P\nAS\nDECLARE VARIABLE X INTEGER;\nBEGIN\n  X = 1;\n  SUSPEND;\nEND"
    );
}

#[test]
fn test_procedure_then_trigger_keep_order() {
    let sql = r#"CREATE TABLE T (ID INTEGER);
SET TERM ^ ;
CREATE PROCEDURE NEXT_ID RETURNS (R INTEGER)
AS
BEGIN
  R = 1; -- placeholder
  SUSPEND;
END^
CREATE TRIGGER T_BI FOR T BEFORE INSERT
AS
BEGIN
  /* uses the procedure above */
  NEW.ID = 1;
END^
SET TERM ; ^
INSERT INTO T VALUES (1);"#;
    let stmts = parse(sql);
    assert_eq!(stmts.len(), 4, "Should have 4 statements, got: {:?}", stmts);
    assert_eq!(stmts[0], "CREATE TABLE T (ID INTEGER)");
    assert!(stmts[1].starts_with("CREATE PROCEDURE NEXT_ID"));
    assert!(stmts[1].contains("R = 1;"));
    assert!(!stmts[1].contains("placeholder"));
    assert!(stmts[2].starts_with("CREATE TRIGGER T_BI"));
    assert!(!stmts[2].contains("uses the procedure"));
    assert!(stmts[2].ends_with("END"));
    assert_eq!(stmts[3], "INSERT INTO T VALUES (1)");
}

#[test]
fn test_multi_character_terminator() {
    let sql = "SET TERM !! ;\nCREATE TRIGGER T FOR X\nAS BEGIN\n  NEW.ID = 1;\nEND!!\nSET TERM ; !!\n";
    assert_eq!(
        parse(sql),
        vec!["CREATE TRIGGER T FOR X\nAS BEGIN\n  NEW.ID = 1;\nEND"]
    );
}

#[test]
fn test_directive_is_case_insensitive() {
    let sql = "set term ^ ;\nB;\nC^\nSet Term ; ^\nD;";
    assert_eq!(parse(sql), vec!["B;\nC", "D"]);
}

#[test]
fn test_malformed_directive_is_consumed() {
    let sql = "A;\nSET TERM\nB;";
    let script = ScriptExecutor::parse_script(sql);
    assert!(script.uses_directives);
    assert_eq!(script.statements, vec!["A", "B"]);
}

#[test]
fn test_directive_flushes_open_statement() {
    let sql = "A\nSET TERM ^ ;\nB^";
    assert_eq!(parse(sql), vec!["A", "B"]);
}

#[test]
fn test_final_statement_without_terminator() {
    let sql = "SET TERM ^ ;\nB^\nSET TERM ; ^\nC";
    assert_eq!(parse(sql), vec!["B", "C"]);
    assert_eq!(parse("A;\nB"), vec!["A", "B"]);
}

#[test]
fn test_empty_statements_dropped() {
    assert!(parse(";;\n  ;\n").is_empty());
    assert_eq!(parse("A;;B;"), vec!["A", "B"]);
    assert_eq!(parse("SET TERM ^ ;\n^\n^^\nB^"), vec!["B"]);
}

#[test]
fn test_blank_script() {
    let script = ScriptExecutor::parse_script("  \n\t\n");
    assert!(script.is_empty());
    assert!(!script.uses_directives);
}

#[test]
fn test_crlf_line_endings() {
    assert_eq!(parse("A;\r\nB;\r\n"), vec!["A", "B"]);
    assert_eq!(
        parse("SET TERM ^ ;\r\nB;\r\nX^\r\nSET TERM ; ^\r\nC;\r\n"),
        vec!["B;\nX", "C"]
    );
}

#[test]
fn test_line_comments_stripped() {
    let sql = "-- header\nCREATE TABLE T (ID INTEGER); -- trailing\n-- footer";
    assert_eq!(parse(sql), vec!["CREATE TABLE T (ID INTEGER)"]);
}

#[test]
fn test_block_comments_stripped() {
    let sql = "CREATE TABLE T (/* id */ ID INTEGER);\n/* multi\nline */\nCREATE TABLE U (ID INTEGER);";
    assert_eq!(
        ScriptExecutor::strip_comments(sql),
        "CREATE TABLE T ( ID INTEGER);\n\nCREATE TABLE U (ID INTEGER);"
    );
    assert_eq!(
        parse(sql),
        vec!["CREATE TABLE T ( ID INTEGER)", "CREATE TABLE U (ID INTEGER)"]
    );
}

#[test]
fn test_unterminated_block_comment_left_in_place() {
    let sql = "SELECT 1;\n/* never closed\nSELECT 2;";
    assert_eq!(ScriptExecutor::strip_comments(sql), sql);
    assert_eq!(parse(sql), vec!["SELECT 1", "/* never closed\nSELECT 2"]);
}

#[test]
fn test_block_comment_close_must_follow_open() {
    assert_eq!(ScriptExecutor::strip_comments("/*/ a */b"), "b");
}

#[test]
fn test_line_comment_marker_inside_string_is_still_a_comment() {
    let sql = "INSERT INTO T VALUES ('a--b');";
    assert_eq!(parse(sql), vec!["INSERT INTO T VALUES ('a"]);
}

#[test]
fn test_strip_comments_is_idempotent() {
    let samples = [
        "A; -- x\nB;",
        "/* a */ A;\r\n/* b\n c */ B;",
        "-/**/- hidden\nA;",
        "A /* open\nB;",
        "line\n\n\n",
        "",
    ];
    for sample in samples {
        let once = ScriptExecutor::strip_comments(sample);
        let twice = ScriptExecutor::strip_comments(&once);
        assert_eq!(once, twice, "not idempotent for {:?}", sample);
    }
    assert_eq!(ScriptExecutor::strip_comments("-/**/- hidden\nA;"), "\nA;");
}

#[test]
fn test_paths_agree_without_directives() {
    let samples = [
        "A;\nB;",
        "A; B;\nC",
        "A\n;B\n\nC;;",
        "CREATE TABLE T (\n  ID INTEGER,\n  NAME VARCHAR(10)\n);\n\nINSERT INTO T VALUES (1, 'x');",
        "  ;\n",
    ];
    for sample in samples {
        let stripped = ScriptExecutor::strip_comments(sample);
        assert_eq!(
            ScriptExecutor::split_simple(&stripped),
            ScriptExecutor::split_with_term_directives(&stripped),
            "paths disagree for {:?}",
            sample
        );
    }
}

#[test]
fn test_round_trip_through_terminator() {
    let sql = "CREATE DOMAIN D AS INTEGER;\n-- t\nCREATE TABLE T (\n  ID D\n);\nINSERT INTO T VALUES (1);";
    let first = parse(sql);
    let rebuilt = first
        .iter()
        .map(|stmt| format!("{};", stmt))
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(parse(&rebuilt), first);
}

#[test]
fn test_round_trip_through_term_directive() {
    let sql = "CREATE TABLE T (ID INTEGER);\nSET TERM ^ ;\nCREATE PROCEDURE P AS\nBEGIN\n  INSERT INTO T VALUES (1);\n  UPDATE T SET ID = 2;\nEND^\nSET TERM ; ^\nGRANT EXECUTE ON PROCEDURE P TO PUBLIC;";
    let first = parse(sql);
    assert_eq!(first.len(), 3);
    assert!(first[1].contains("VALUES (1);\n"), "{:?}", first[1]);

    let rebuilt = format!(
        "SET TERM ^ ;\n{}\nSET TERM ; ^",
        first
            .iter()
            .map(|stmt| format!("{}^", stmt))
            .collect::<Vec<_>>()
            .join("\n")
    );
    assert_eq!(parse(&rebuilt), first);
}

#[test]
fn test_lone_carriage_return_ends_a_line() {
    assert_eq!(parse("A; -- note\rB;\r"), vec!["A", "B"]);
    assert_eq!(
        parse("SET TERM ^ ;\rP;\rQ^\rSET TERM ; ^\rR;"),
        vec!["P;\nQ", "R"]
    );
}

#[test]
fn test_statements_are_trimmed_and_terminator_free() {
    let cases: [(&str, &str); 3] = [
        ("A;\n ; B ;;\n C", ";"),
        ("SET TERM ^ ;\n  X ^ Y^\n^ Z ^", "^"),
        ("SET TERM !! ;\n!!P!!\n  Q !!", "!!"),
    ];
    for (sql, terminator) in cases {
        for stmt in parse(sql) {
            assert!(!stmt.is_empty());
            assert_eq!(stmt, stmt.trim());
            assert!(
                !stmt.starts_with(terminator) && !stmt.ends_with(terminator),
                "statement {:?} keeps terminator {:?}",
                stmt,
                terminator
            );
        }
    }
}

#[test]
fn test_parse_term_directive() {
    let cases = [
        ("SET TERM ^ ;", Some("^")),
        ("SET TERM ^;", Some("^")),
        ("SET TERM ; ^", Some(";")),
        ("set term # ;", Some("#")),
        ("SET TERM !! ;", Some("!!")),
        ("SET TERM", None),
        ("SET TERM ;", Some(";")),
    ];
    for (line, expected) in cases {
        assert_eq!(
            ScriptExecutor::parse_term_directive(line).as_deref(),
            expected,
            "line {:?}",
            line
        );
    }
}

#[test]
fn test_is_term_directive() {
    assert!(ScriptExecutor::is_term_directive("SET TERM ^ ;"));
    assert!(ScriptExecutor::is_term_directive("set term ^ ;"));
    assert!(!ScriptExecutor::is_term_directive("SETTERM ^"));
    assert!(!ScriptExecutor::is_term_directive("SELECT 'SET TERM'"));
    assert!(!ScriptExecutor::is_term_directive("SET"));
}

#[test]
fn test_directive_detection_routes_parser() {
    assert!(ScriptExecutor::contains_term_directive("x\nset Term ^;"));
    assert!(!ScriptExecutor::contains_term_directive("SET TRANSACTION;"));
    assert!(!ScriptExecutor::parse_script("A;").uses_directives);
}
