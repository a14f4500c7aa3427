//! Built-in prompt texts. Every user format holds exactly one `%s`.

pub const DEFAULT_SYSTEM: &str = "You are a senior software engineer. You write Git commit messages that follow the gitcommit(5) guidelines AND Conventional Commits for the subject line. Be concise, concrete, and accurate.";

pub const DEFAULT_USER: &str = r#"Write a Git commit message for this diff. Focus on what changed and why it matters (not filenames).

<diff>
%s
</diff>

RULES:
1. Output ONLY the commit message (no Markdown, no quotes, no code fences).
2. Use this structure:
   - Line 1: subject (summary)
   - Optional: blank line
   - Optional: body (one or more lines)
3. Subject:
   - MUST use Conventional Commits format: <type>(<scope>)?: <summary>
   - Allowed types: feat, fix, docs, style, refactor, perf, test, build, ci, chore, revert
   - Use an optional scope when it helps (e.g. feat(auth): ...)
   - English, imperative mood if possible
   - No trailing period
   - Aim for <= 50 characters; hard limit: 100 characters
4. Body (only if needed to explain why/impact/behavior change):
   - MUST be separated from the subject by a blank line
   - Wrap lines to <= 120 characters
   - Explain WHAT and WHY; avoid implementation details unless necessary
5. If no body is needed, return a single-line subject.

ANALYZE:
- What new capability was added?
- What bug was fixed?
- What behavior changed and why?
- What risks or compatibility notes matter?
- Read the CODE CONTENT, not just filenames

EXAMPLES:
✓ feat(cli): add dry-run flag to preview generated commit message
✓ fix(git): avoid panic when staged diff is empty
✓ refactor(config): support XDG_CONFIG_HOME
✓ chore(deps): update dependencies to address security advisory

✓ feat(editor): add editor support for reviewing commit message

This lets users edit the generated message before committing and reduces
incorrect commits caused by prompt misunderstandings."#;

pub const CHINESE_SYSTEM: &str =
    "你是一个专业的代码审查助手，擅长根据代码变更生成符合规范的提交信息。";

pub const CHINESE_USER: &str = r#"基于以下git diff，生成一个符合常规提交格式的中文提交信息：

<diff>
%s
</diff>

要求：
1. 使用常规提交格式（类型: 描述）
2. 控制在72个字符以内
3. 使用现在时态
4. 具体说明变更内容
5. 如果有多个变更，专注于最重要的一个

有效类型：feat（功能）, fix（修复）, docs（文档）, style（格式）, refactor（重构）, test（测试）, chore（杂务）, perf（性能）, build（构建）, ci（CI）

只返回提交信息，不要额外的文字。"#;

pub const DETAILED_SYSTEM: &str =
    "You are an expert software engineer who writes comprehensive and descriptive commit messages.";

pub const DETAILED_USER: &str = r#"Based on the following git diff, generate a detailed commit message following the conventional commits format:

<diff>
%s
</diff>

Requirements:
1. Use conventional commits format (type: description)
2. Keep the first line under 72 characters
3. Use present tense
4. Be specific about what changed and why
5. If there are multiple changes, focus on the most important one
6. Consider the impact and reasoning behind the changes
7. Use technical but clear language

Valid types: feat, fix, docs, style, refactor, test, chore, perf, build, ci

Return only the commit message, no additional text."#;

pub const MINIMAL_SYSTEM: &str = "Generate concise git commit messages.";

pub const MINIMAL_USER: &str = r#"From this diff: %s

Write a short commit message (max 50 chars) in format "type: what changed".
Types: feat, fix, docs, style, refactor, test, chore, perf, build, ci"#;

pub const TAG_SYSTEM: &str = "You are a senior software engineer and release manager. You write accurate, concise Git annotated tag messages (release notes) based strictly on the provided context.";

pub const TAG_USER: &str = r#"Write an annotated Git tag message (release notes) for the release described below.

<context>
%s
</context>

RULES:
1. Output ONLY the tag message (no Markdown, no quotes, no code fences).
2. Language: English.
3. First line: "Release <version>" (use the version provided in context).
4. Use these sections when applicable (omit empty sections):
   - Added
   - Changed
   - Fixed
   - Breaking Changes
5. Use bullet points under each section. Keep bullets concrete and user-facing.
6. Base the content ONLY on the provided context. Do not invent changes.
7. If the context is insufficient, say so briefly and conservatively.
"#;
