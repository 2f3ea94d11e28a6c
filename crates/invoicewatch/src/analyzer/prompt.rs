//! Prompt and response schema sent with every analysis request.

use serde_json::{json, Value};

/// Instructions for the model. The risk rules here are the only place the
/// compliance policy is written down; nothing downstream re-checks them.
pub const AUDIT_PROMPT: &str = "\
You are a forensic invoice auditor advising the owner of a small business.
Read the attached invoice (image or PDF) and answer with JSON only: no
markdown, no prose around it. When a value is missing or unreadable, use
null and let the risk assessment reflect the uncertainty.

Fields:
- vendorName: the seller's name.
- totalAmount: the grand total as a plain number, without currency symbols.
- invoiceDate: YYYY-MM-DD.
- dueDate: YYYY-MM-DD. When absent, invoiceDate plus 30 days.
- summary: what was bought, in at most 15 plain words.
- isGstMissing: true when the seller's GSTIN / tax id is absent.
- isRegulatoryItem: true for chemicals, hazardous or restricted goods, or
  unusually expensive machinery.
- complianceRiskLevel: HIGH when isGstMissing or isRegulatoryItem is true;
  MEDIUM when the invoice is incomplete or looks suspicious; LOW only when
  everything looks compliant.
- legalImpact: one direct sentence about the money at stake (for example
  lost input tax credit). No statute numbers, no legal jargon.
- paymentAdvice: exactly one of \"Safe to pay\",
  \"Hold payment - Request valid invoice\",
  \"High risk - Review before payment\".
";

/// Response schema in the provider's OpenAPI subset.
pub fn response_schema() -> Value {
    let nullable_string = json!({ "type": "STRING", "nullable": true });
    json!({
        "type": "OBJECT",
        "properties": {
            "vendorName": nullable_string,
            "totalAmount": { "type": "NUMBER", "nullable": true },
            "invoiceDate": nullable_string,
            "dueDate": nullable_string,
            "isGstMissing": { "type": "BOOLEAN" },
            "isRegulatoryItem": { "type": "BOOLEAN" },
            "complianceRiskLevel": { "type": "STRING", "enum": ["LOW", "MEDIUM", "HIGH"] },
            "summary": { "type": "STRING" },
            "legalImpact": { "type": "STRING" },
            "paymentAdvice": { "type": "STRING" }
        },
        "required": [
            "vendorName",
            "totalAmount",
            "invoiceDate",
            "dueDate",
            "isGstMissing",
            "isRegulatoryItem",
            "complianceRiskLevel",
            "summary",
            "legalImpact",
            "paymentAdvice"
        ]
    })
}
