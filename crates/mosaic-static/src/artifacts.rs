//! Generated deployment artifacts: server directives, sitemap, robots and
//! the deployment README.

use chrono::NaiveDate;
use minijinja::{context, AutoEscape, Environment};

/// Content of the output directory's `.gitignore`.
pub const GITIGNORE: &str = "*\n!.gitignore\n";

/// Values shared by the artifact templates.
#[derive(Debug, Clone)]
pub struct ArtifactContext {
    /// Public site URL without trailing slash
    pub site_url: String,
    /// Site title used in the README
    pub site_title: String,
    /// Output directory name, as shown in the README
    pub output_name: String,
    /// Build date
    pub date: NaiveDate,
}

/// Renders artifact templates using minijinja.
pub struct ArtifactTemplates {
    env: Environment<'static>,
}

impl ArtifactTemplates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        // HTML escaping would turn every `/` in a URL into `&#x2f;`; XML
        // values go through the `xml` filter instead.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.add_filter("xml", escape_xml);

        env.add_template("htaccess", HTACCESS_TEMPLATE)?;
        env.add_template("sitemap", SITEMAP_TEMPLATE)?;
        env.add_template("robots", ROBOTS_TEMPLATE)?;
        env.add_template("readme", README_TEMPLATE)?;

        Ok(Self { env })
    }

    pub fn htaccess(&self) -> Result<String, minijinja::Error> {
        self.env.get_template("htaccess")?.render(context! {})
    }

    pub fn sitemap(&self, ctx: &ArtifactContext) -> Result<String, minijinja::Error> {
        self.render("sitemap", ctx)
    }

    pub fn robots(&self, ctx: &ArtifactContext) -> Result<String, minijinja::Error> {
        self.render("robots", ctx)
    }

    pub fn readme(&self, ctx: &ArtifactContext) -> Result<String, minijinja::Error> {
        self.render("readme", ctx)
    }

    fn render(&self, name: &str, ctx: &ArtifactContext) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(context! {
            site_url => ctx.site_url.trim_end_matches('/'),
            site_title => &ctx.site_title,
            output_name => &ctx.output_name,
            lastmod => ctx.date.format("%Y-%m-%d").to_string(),
            updated => ctx.date.format("%d/%m/%Y").to_string(),
        })
    }
}

/// Escape the five XML special characters.
fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

const HTACCESS_TEMPLATE: &str = r#"# Apache configuration for the static site
# Compression
<IfModule mod_deflate.c>
  AddOutputFilterByType DEFLATE text/html text/plain text/xml text/css text/javascript application/javascript application/json
</IfModule>

# Static file caching
<IfModule mod_expires.c>
  ExpiresActive On
  ExpiresByType image/jpg "access plus 1 year"
  ExpiresByType image/jpeg "access plus 1 year"
  ExpiresByType image/png "access plus 1 year"
  ExpiresByType image/gif "access plus 1 year"
  ExpiresByType text/css "access plus 1 month"
  ExpiresByType application/javascript "access plus 1 month"
  ExpiresByType text/html "access plus 0 seconds"
</IfModule>

# Security headers
<IfModule mod_headers.c>
  Header set X-Content-Type-Options "nosniff"
  Header set X-Frame-Options "SAMEORIGIN"
  Header set X-XSS-Protection "1; mode=block"
</IfModule>

# Route unknown paths to index.html
<IfModule mod_rewrite.c>
  RewriteEngine On
  RewriteBase /
  RewriteRule ^index\.html$ - [L]
  RewriteCond %{REQUEST_FILENAME} !-f
  RewriteCond %{REQUEST_FILENAME} !-d
  RewriteRule . /index.html [L]
</IfModule>

# MIME types
<IfModule mod_mime.c>
  AddType application/javascript .js
  AddType text/css .css
</IfModule>
"#;

const SITEMAP_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{{ site_url|xml }}/</loc>
    <lastmod>{{ lastmod }}</lastmod>
    <changefreq>weekly</changefreq>
    <priority>1.0</priority>
  </url>
</urlset>
"#;

const ROBOTS_TEMPLATE: &str = r#"User-agent: *
Allow: /

Sitemap: {{ site_url }}/sitemap.xml
"#;

const README_TEMPLATE: &str = r#"# Static site - {{ site_title }}

This directory holds the optimised static build of the website, ready to deploy.

## Structure

```
{{ output_name }}/
├── index.html          # Main page
├── css/
│   └── main.css        # Compiled styles
├── js/
│   └── main.js         # JavaScript
├── public/             # Images and other resources
├── data/
│   └── articles.json   # Blog articles
├── .htaccess           # Apache configuration (cache, compression)
├── sitemap.xml         # Sitemap for search engines
└── robots.txt          # Crawler directives
```

## Deployment

### Recommended hosts

- **GitHub Pages**: free and simple
- **Netlify**: deploys from Git, free HTTPS
- **Vercel**: fast global CDN
- **Surge.sh**: quick one-command deploys
- **Apache/Nginx server**: traditional hosting

### Commands

```bash
# Netlify (requires netlify-cli)
netlify deploy --prod --dir={{ output_name }}

# Surge.sh (requires surge)
surge {{ output_name }}/

# Local preview
mosaic serve --dir {{ output_name }}
```

## Included optimisations

- Gzip compression for text files
- Static file caching (1 year for images, 1 month for CSS/JS)
- Security headers (X-Frame-Options, etc.)
- XML sitemap
- robots.txt
- Root-relative asset paths

## Configuration

`.htaccess` targets Apache. Adapt the same rules for Nginx if needed.

---

**Last updated**: {{ updated }}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> ArtifactContext {
        ArtifactContext {
            site_url: "https://example.com/".to_string(),
            site_title: "Clinic".to_string(),
            output_name: "dist".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
        }
    }

    #[test]
    fn renders_sitemap_with_lastmod() {
        let templates = ArtifactTemplates::new().unwrap();

        let sitemap = templates.sitemap(&ctx()).unwrap();

        assert!(sitemap.contains("<loc>https://example.com/</loc>"));
        assert!(sitemap.contains("<lastmod>2025-03-07</lastmod>"));
        assert_eq!(sitemap.matches("<url>").count(), 1);
    }

    #[test]
    fn sitemap_escapes_url() {
        let templates = ArtifactTemplates::new().unwrap();
        let ctx = ArtifactContext {
            site_url: "https://example.com/?a=1&b=<2>".to_string(),
            ..ctx()
        };

        let sitemap = templates.sitemap(&ctx).unwrap();

        assert!(sitemap.contains("<loc>https://example.com/?a=1&amp;b=&lt;2&gt;/</loc>"));
    }

    #[test]
    fn renders_robots() {
        let templates = ArtifactTemplates::new().unwrap();

        let robots = templates.robots(&ctx()).unwrap();

        assert_eq!(
            robots,
            "User-agent: *\nAllow: /\n\nSitemap: https://example.com/sitemap.xml\n"
        );
    }

    #[test]
    fn renders_readme_date_and_tree() {
        let templates = ArtifactTemplates::new().unwrap();

        let readme = templates.readme(&ctx()).unwrap();

        assert!(readme.starts_with("# Static site - Clinic"));
        assert!(readme.contains("**Last updated**: 07/03/2025"));
        assert!(readme.contains("dist/\n├── index.html"));
    }

    #[test]
    fn renders_htaccess_directives() {
        let templates = ArtifactTemplates::new().unwrap();

        let htaccess = templates.htaccess().unwrap();

        assert!(htaccess.contains("mod_deflate"));
        assert!(htaccess.contains(r#"Header set X-Frame-Options "SAMEORIGIN""#));
        assert!(htaccess.contains(r"RewriteRule ^index\.html$ - [L]"));
    }
}
