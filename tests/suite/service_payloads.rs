//! Every reply shape the tokenizer service produces, fetched over HTTP and
//! normalized.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use lexlens_analysis::{AnalysisError, Analyzer, HttpAnalyzer, ServiceConfig, normalize};
use lexlens_types::{Severity, TokenCategory};

use crate::common::{error_record, mount_reply, start_tokenizer_mock};

async fn analyze(body: serde_json::Value) -> Result<lexlens_analysis::Analysis, AnalysisError> {
    let server = start_tokenizer_mock().await;
    mount_reply(&server, body).await;
    let analyzer = HttpAnalyzer::new(&ServiceConfig::default().with_endpoint(server.uri()))?;
    analyzer.analyze("int x = 5".to_string()).await.and_then(normalize)
}

#[tokio::test]
async fn test_record_array_with_warning() {
    let analysis = analyze(json!([
        error_record(0, 5, "expected ;"),
        { "line": 3, "column": 0, "message": "unused variable", "message_type": "Warning" }
    ]))
    .await
    .unwrap();

    let diagnostics = analysis.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].severity(), Severity::Error);
    assert_eq!((diagnostics[1].line(), diagnostics[1].column()), (4, 1));
    assert_eq!(diagnostics[1].severity(), Severity::Warning);
    assert!(analysis.tokens().is_none());
}

#[tokio::test]
async fn test_bare_string_is_one_error_at_origin() {
    let analysis = analyze(json!("Syntax Error: unexpected '}'")).await.unwrap();
    let diagnostics = analysis.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!((diagnostics[0].line(), diagnostics[0].column()), (1, 1));
    assert_eq!(diagnostics[0].message(), "Syntax Error: unexpected '}'");
}

#[tokio::test]
async fn test_sentinel_string_means_no_diagnostics() {
    let analysis = analyze(json!("No errors found.")).await.unwrap();
    assert!(analysis.diagnostics().is_empty());
}

#[tokio::test]
async fn test_plain_text_body_is_a_bare_message() {
    let server = start_tokenizer_mock().await;
    Mock::given(method("POST"))
        .and(path("/tokenize"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Syntax Error: line 2"))
        .mount(&server)
        .await;
    let analyzer =
        HttpAnalyzer::new(&ServiceConfig::default().with_endpoint(server.uri())).unwrap();

    let analysis = analyzer
        .analyze("x".to_string())
        .await
        .and_then(normalize)
        .unwrap();
    assert_eq!(analysis.diagnostics()[0].message(), "Syntax Error: line 2");
}

#[tokio::test]
async fn test_token_stream_fills_panel_without_diagnostics() {
    let analysis = analyze(json!({
        "tokens": [
            { "token_global": "Identifier", "token_type": "Int", "lexeme": "int", "line": 0, "column": 0 },
            { "token_global": "Variable", "token_type": "Variable", "lexeme": "x", "line": 0, "column": 4 },
            { "token_global": "Symbol", "token_type": "Assign", "lexeme": "=", "line": 0, "column": 6 },
            { "token_global": "Literal", "token_type": "Numeric", "lexeme": "5", "line": 0, "column": 8 }
        ]
    }))
    .await
    .unwrap();

    assert!(analysis.diagnostics().is_empty());
    let tokens = analysis.tokens().unwrap();
    assert_eq!(tokens.entries(TokenCategory::Identifier), ["int"]);
    assert_eq!(tokens.entries(TokenCategory::Variable), ["x"]);
    assert_eq!(tokens.entries(TokenCategory::Symbol), ["="]);
    assert_eq!(tokens.entries(TokenCategory::Literal), ["5: Numeric"]);
    assert_eq!(tokens.total(), 4);
}

#[tokio::test]
async fn test_errors_object_with_categories() {
    let analysis = analyze(json!({
        "errors": [{ "line": 1, "column": 2, "message": "Syntax Error: expected ')'" }],
        "reserved_words": ["if"],
        "literals": { "0": "Numeric" }
    }))
    .await
    .unwrap();

    let diagnostics = analysis.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!((diagnostics[0].line(), diagnostics[0].column()), (2, 3));
    let tokens = analysis.tokens().unwrap();
    assert_eq!(tokens.entries(TokenCategory::ReservedWord), ["if"]);
    assert_eq!(tokens.entries(TokenCategory::Literal), ["0: Numeric"]);
}

#[tokio::test]
async fn test_unrecognized_shape_is_malformed() {
    let err = analyze(json!({ "status": "ok" })).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Malformed(_)));
    assert!(!err.is_transport());
}
