// 备注与审批意见的长度上限（与前端输入框限制一致）
const MAX_NOTE_LEN: usize = 2000;

pub fn validate_remarks(remarks: Option<&str>) -> Result<(), &'static str> {
    if let Some(text) = remarks {
        // 备注可以为空，但不能超长
        if text.chars().count() > MAX_NOTE_LEN {
            return Err("Remarks must not exceed 2000 characters");
        }
    }
    Ok(())
}

/// 驳回理由校验：必须有实际内容且不超长
pub fn validate_rejection_notes(notes: &str) -> Result<(), &'static str> {
    if notes.trim().is_empty() {
        return Err("Rejection notes must not be empty");
    }
    if notes.chars().count() > MAX_NOTE_LEN {
        return Err("Rejection notes must not exceed 2000 characters");
    }
    Ok(())
}

/// 审批意见（通过时可选）校验：仅限制长度
pub fn validate_review_notes(notes: Option<&str>) -> Result<(), &'static str> {
    if let Some(text) = notes {
        if text.chars().count() > MAX_NOTE_LEN {
            return Err("Review notes must not exceed 2000 characters");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remarks_optional() {
        assert!(validate_remarks(None).is_ok());
        assert!(validate_remarks(Some("")).is_ok());
        assert!(validate_remarks(Some("补交实验报告后更正")).is_ok());
    }

    #[test]
    fn test_remarks_too_long() {
        let long = "x".repeat(2001);
        assert!(validate_remarks(Some(&long)).is_err());
    }

    #[test]
    fn test_rejection_notes_required() {
        assert!(validate_rejection_notes("缺少补考材料").is_ok());
        assert!(validate_rejection_notes("").is_err());
        assert!(validate_rejection_notes("   ").is_err());
    }

    #[test]
    fn test_review_notes_length() {
        assert!(validate_review_notes(None).is_ok());
        assert!(validate_review_notes(Some("材料齐全")).is_ok());
        let long = "x".repeat(2001);
        assert!(validate_review_notes(Some(&long)).is_err());
    }
}
